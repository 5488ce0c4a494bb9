use std::{sync::Weak, time::Duration};

use html_escape::encode_text;
use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatId, ParseMode},
    Bot,
};

use crate::{
    upstream::{collector::Collector, UpstreamError},
    AppState,
};

/// Send `text` to everyone on the collector roster. Individual delivery
/// failures are logged and skipped; returns how many sends went through.
pub async fn broadcast_notification(
    bot: &Bot,
    collector: &Collector,
    text: &str,
) -> Result<usize, UpstreamError> {
    let roster = collector.fetch_roster().await?;

    let mut delivered = 0;
    for user in roster {
        let send = bot
            .send_message(
                ChatId(user.0 as i64),
                format!("📢 Notification: {}", encode_text(text)),
            )
            .parse_mode(ParseMode::Html)
            .await;

        match send {
            Ok(_) => delivered += 1,
            Err(e) => log::warn!("Failed to notify {user}: {e}"),
        }
    }

    Ok(delivered)
}

/// Once a day, ship the counters to the collector and open a fresh
/// "verified today" period. The period rolls over even when the push
/// failed. Ends when the state it watches is gone.
pub async fn stats_rollover_spinloop(state: Weak<AppState>) {
    const PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

    loop {
        tokio::time::sleep(PERIOD).await;

        let Some(state) = state.upgrade() else {
            break;
        };

        let snapshot = state.access.stats().snapshot();
        match state.collector.push_stats(&snapshot).await {
            Ok(()) => log::info!("Shipped stats to the collector: {snapshot:?}"),
            Err(e) => log::warn!("Failed to ship stats to the collector: {e}"),
        }

        state.access.stats().start_new_period();
    }
}
