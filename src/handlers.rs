use std::sync::{Arc, LazyLock};

use teloxide::{
    payloads::SendMessageSetters,
    prelude::*,
    types::{BotCommand, InlineKeyboardButton, InlineKeyboardMarkup, Me, Recipient, UserId},
    RequestError,
};
use url::Url;

use crate::{access::VerifyCode, actions, links, AppState, REQUIRED_CHANNEL};

static CHANNEL_LINK: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://t.me/botzwala").expect("URL will always be valid"));
static BYPASS_GUIDE_LINK: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://t.me/openshortnerlinks/2").expect("URL will always be valid")
});
static WATCH_GUIDE_LINK: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://t.me/dterabox/5").expect("URL will always be valid"));

static SUBSCRIBE_PROMPT: &str =
    "❗️ Please subscribe to the channel and click /start again to use this bot.";

static WELCOME: &str = "👋 Welcome to Terabox Downloader and Streamer Bot. \
Give me a Terabox link to download it or stream it.";

static WELCOME_UNVERIFIED: &str = "👋 Welcome to Terabox Downloader and Streamer Bot. \
Give me a Terabox link to download it or stream it. \
To use the bot, you need to verify your access first.";

static TOKEN_EXPIRED: &str = "Hello,\n\n\
It seems like your Ads token has expired. Please refresh your token and try again.\n\n\
Token Timeout: 12 hours\n\n\
What is a token?\n\n\
This is an Ads token. After viewing 1 ad, you can utilize the bot for the next 12 hours.\n\n\
Keep the interactions going smoothly 🚀";

static NO_LINK_FOUND: &str = "🚫 No valid Terabox link found in the message.";

static REQUEST_FAILED: &str = "❌ There was an error processing your request. Please try again. \
If the problem persists, contact admin @fattasuck.";

static VERIFIED: &str =
    "✅ Verification success. You can now use the bot for the next 12 hours.";

static INVALID_CODE: &str = "❌ Invalid code. Please click /start to verify again.";

static VIDEO_READY: &str = "🎬 Here is your video. If not opening and stuck on browser try \
other links. You can either watch it directly or follow the guide to watch it:";

pub fn generate_bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "check your access and how to use the bot"),
        BotCommand::new("stats", "show usage counters"),
        BotCommand::new("reset", "revoke every access window"),
        BotCommand::new("change", "switch to the other shortener endpoint"),
        BotCommand::new("api", "show the active shortener endpoint"),
        BotCommand::new("notify", "broadcast a message to all known users"),
    ]
}

pub async fn handle_message(
    bot: Bot,
    me: Me,
    message: Message,
    state: Arc<AppState>,
) -> Result<(), RequestError> {
    if handle_command(&bot, &me, &message, &state).await? {
        return Ok(());
    }

    handle_link_request(&bot, &me, &message, &state).await
}

/// Returns `true` if a command was parsed and responded to.
async fn handle_command(
    bot: &Bot,
    me: &Me,
    message: &Message,
    state: &AppState,
) -> Result<bool, RequestError> {
    let Some(text) = message.text() else {
        return Ok(false);
    };
    if !text.starts_with('/') {
        return Ok(false);
    }
    let Some(command) = text.split_whitespace().next() else {
        return Ok(false);
    };

    let command_full_len = command.len();

    // Trim the bot's username from the command and convert to lowercase.
    let username = format!("@{}", me.username());
    let command = command.trim_end_matches(username.as_str()).to_lowercase();
    let params = text[command_full_len..].trim_start();

    let chat_id = message.chat.id;

    let command_processed: bool = match command.as_str() {
        "/start" => {
            handle_start(bot, message, state, params).await?;
            true
        }
        "/stats" => {
            let snapshot = state.access.stats().snapshot();
            bot.send_message(
                chat_id,
                format!(
                    "📊 Bot Statistics:\n\
                     - Users: {}\n\
                     - Links Processed: {}\n\
                     - Verified Users Today: {}",
                    snapshot.users, snapshot.links_resolved, snapshot.verified_today
                ),
            )
            .await?;
            true
        }
        "/reset" => {
            state.access.reset_all();
            log::info!("All access windows were revoked by an admin command");
            bot.send_message(
                chat_id,
                "✅ All users have been reset. They need to verify their access again.",
            )
            .await?;
            true
        }
        "/change" => {
            let endpoint = state.shortener.switch_endpoint();
            bot.send_message(chat_id, format!("✅ API has been changed to: {endpoint}"))
                .await?;
            true
        }
        "/api" => {
            bot.send_message(
                chat_id,
                format!("📡 Current API: {}", state.shortener.active_endpoint()),
            )
            .await?;
            true
        }
        "/notify" => {
            if params.is_empty() {
                bot.send_message(chat_id, "Usage: /notify <text>").await?;
            } else {
                match actions::broadcast_notification(bot, &state.collector, params).await {
                    Ok(delivered) => {
                        log::info!("Broadcast delivered to {delivered} users");
                        bot.send_message(chat_id, "✅ Notification sent to all users.")
                            .await?;
                    }
                    Err(e) => {
                        log::error!("Failed to fetch the roster for a broadcast: {e}");
                        bot.send_message(
                            chat_id,
                            "❌ Error sending notifications. Please try again later.",
                        )
                        .await?;
                    }
                }
            }
            true
        }
        _ => false,
    };

    Ok(command_processed)
}

async fn handle_start(
    bot: &Bot,
    message: &Message,
    state: &AppState,
    params: &str,
) -> Result<(), RequestError> {
    let Some(user) = &message.from else {
        return Ok(());
    };
    let chat_id = message.chat.id;

    if params.is_empty() {
        state.access.stats().note_user_seen(user.id);
    }

    if !is_channel_member(bot, user.id).await {
        return send_subscribe_prompt(bot, chat_id).await;
    }

    if !params.is_empty() {
        // Came back through the verification link with a code payload.
        return handle_redemption(bot, chat_id, state, params).await;
    }

    // The roster is best-effort; the user shouldn't notice it failing.
    if let Err(e) = state.collector.push_user(user.id).await {
        log::warn!("Failed to push user {} to the roster: {e}", user.id);
    }

    let greeting = if state.access.is_authorized(user.id) {
        WELCOME
    } else {
        WELCOME_UNVERIFIED
    };
    bot.send_message(chat_id, greeting).await?;

    Ok(())
}

async fn handle_redemption(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState,
    code: &str,
) -> Result<(), RequestError> {
    match state.access.redeem(code) {
        Some(user) => {
            log::info!("User {user} redeemed a verification code");
            bot.send_message(chat_id, VERIFIED).await?;
        }
        None => {
            bot.send_message(chat_id, INVALID_CODE).await?;
        }
    }
    Ok(())
}

async fn handle_link_request(
    bot: &Bot,
    me: &Me,
    message: &Message,
    state: &AppState,
) -> Result<(), RequestError> {
    let Some(user) = &message.from else {
        return Ok(());
    };
    let Some(text) = message.text() else {
        return Ok(());
    };

    if !is_channel_member(bot, user.id).await {
        return send_subscribe_prompt(bot, message.chat.id).await;
    }

    if !links::mentions_host(text) {
        return Ok(());
    }

    if !state.access.is_authorized(user.id) {
        return send_verification_prompt(bot, me, message.chat.id, user.id, state).await;
    }

    let Some(share_link) = links::find_share_link(text) else {
        bot.send_message(message.chat.id, NO_LINK_FOUND).await?;
        return Ok(());
    };

    resolve_and_send(bot, message.chat.id, state, share_link).await
}

/// Issue a fresh code for `user` and send them the ad-gated link that
/// redeems it. Any previously issued codes stay valid alongside it.
async fn send_verification_prompt(
    bot: &Bot,
    me: &Me,
    chat_id: ChatId,
    user: UserId,
    state: &AppState,
) -> Result<(), RequestError> {
    let code = state.access.issue_code(user);
    let deep_link = verification_deep_link(me.username(), &code);

    let short_link = match state.shortener.shorten(&deep_link).await {
        Ok(short_link) => short_link,
        Err(e) => {
            log::error!("Failed to shorten the verification link for {user}: {e}");
            bot.send_message(chat_id, REQUEST_FAILED).await?;
            return Ok(());
        }
    };

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url(
            "✅ Click Here".to_string(),
            short_link,
        )],
        vec![InlineKeyboardButton::url(
            "❓ How to Bypass".to_string(),
            BYPASS_GUIDE_LINK.clone(),
        )],
    ]);

    bot.send_message(chat_id, TOKEN_EXPIRED)
        .reply_markup(keyboard)
        .await?;

    Ok(())
}

async fn resolve_and_send(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState,
    share_link: &str,
) -> Result<(), RequestError> {
    let progress = bot.send_message(chat_id, "⏳ Requesting API...").await?;

    let video_url = match state.resolver.resolve(share_link).await {
        Ok(video_url) => video_url,
        Err(e) => {
            log::error!("Failed to resolve {share_link}: {e}");
            bot.send_message(chat_id, REQUEST_FAILED).await?;
            return Ok(());
        }
    };

    bot.edit_message_text(
        chat_id,
        progress.id,
        "✅ API Request successful. Preparing your video...",
    )
    .await?;

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url(
            "🎥 Click to See Video".to_string(),
            video_url,
        )],
        vec![InlineKeyboardButton::url(
            "❓ How to Watch".to_string(),
            WATCH_GUIDE_LINK.clone(),
        )],
    ]);
    bot.send_message(chat_id, VIDEO_READY)
        .reply_markup(keyboard)
        .await?;

    state.access.stats().note_link_resolved();

    bot.delete_message(chat_id, progress.id).await?;

    Ok(())
}

/// The deep link that brings a user back to the bot with `code` as the
/// start payload. Bot usernames are ASCII and codes are decimal digits, so
/// this always parses.
fn verification_deep_link(bot_username: &str, code: &VerifyCode) -> Url {
    Url::parse(&format!(
        "https://telegram.me/{bot_username}?start={code}"
    ))
    .expect("Deep link is a valid URL")
}

/// The channel-membership gate. Any failure to ask Telegram counts as
/// "not a member".
async fn is_channel_member(bot: &Bot, user: UserId) -> bool {
    let channel = Recipient::ChannelUsername(REQUIRED_CHANNEL.to_string());
    match bot.get_chat_member(channel, user).await {
        Ok(member) => {
            member.kind.is_owner() || member.kind.is_administrator() || member.kind.is_member()
        }
        Err(e) => {
            log::warn!("Failed to check channel membership of {user}: {e}");
            false
        }
    }
}

async fn send_subscribe_prompt(bot: &Bot, chat_id: ChatId) -> Result<(), RequestError> {
    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        "📢 Subscribe to channel".to_string(),
        CHANNEL_LINK.clone(),
    )]]);

    bot.send_message(chat_id, SUBSCRIBE_PROMPT)
        .reply_markup(keyboard)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::access::AccessControl;

    #[test]
    fn deep_link_carries_the_code_as_start_payload() {
        let engine = AccessControl::new();
        let code = engine.issue_code(UserId(42));

        let link = verification_deep_link("SomeStreamBot", &code);

        assert_eq!(link.host_str(), Some("telegram.me"));
        assert_eq!(link.path(), "/SomeStreamBot");
        assert_eq!(link.query(), Some(format!("start={code}").as_str()));
    }
}
