use std::{fs, sync::Arc};

use teloxide::{dptree::deps, prelude::*};

use crate::{
    access::AccessControl,
    actions, handlers, keepalive,
    upstream::{collector::Collector, http_client, resolver::VideoResolver, shortener::Shortener},
};

/// Everything the handlers share: the verification engine and the upstream
/// clients. One per process, behind an `Arc`.
pub struct AppState {
    pub access: AccessControl,
    pub shortener: Shortener,
    pub resolver: VideoResolver,
    pub collector: Collector,
}

impl AppState {
    pub fn new() -> Self {
        let client = http_client();
        AppState {
            access: AccessControl::new(),
            shortener: Shortener::new(client.clone()),
            resolver: VideoResolver::new(client.clone()),
            collector: Collector::new(client),
        }
    }
}

/// # Panics
///
/// Panics if there's no key file, or if Telegram rejects the startup calls.
pub async fn entry() {
    let key = fs::read_to_string(match cfg!(debug_assertions) {
        true => "key_debug",
        false => "key",
    })
    .expect("Could not load bot key file!");

    let bot = Bot::new(key);

    bot.set_my_commands(handlers::generate_bot_commands())
        .await
        .expect("Failed to set bot commands!");

    let state = Arc::new(AppState::new());

    tokio::spawn(keepalive::serve());
    tokio::spawn(actions::stats_rollover_spinloop(Arc::downgrade(&state)));

    log::info!("Creating the handler...");

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    log::info!("Dispatching the dispatcher!");

    Dispatcher::builder(bot, handler)
        .default_handler(|_| async {})
        .dependencies(deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("The dispatcher has stopped.");
}
