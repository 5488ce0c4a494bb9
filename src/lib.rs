//! Source code for a Telegram bot that trades one ad click for twelve hours
//! of access to a video share-link resolver, behind a mandatory channel
//! subscription.

/// Access windows, verification codes, and the engine tying them together.
pub mod access;

/// Usage counters surfaced by the stats command.
pub mod stats;

/// Recognizing supported video share links in message text.
pub mod links;

/// Clients for the shortener, resolver and collector services.
pub mod upstream;

/// Functions that handle events from Telegram.
pub mod handlers;

/// Functions that perform stuff via the bot.
pub mod actions;

/// Tiny HTTP listener for hosting platforms that ping their apps.
pub mod keepalive;

/// Entry function that starts the bot.
mod entry;
pub use entry::*;

/// Username of the channel every user must be subscribed to before the bot
/// serves them anything.
pub static REQUIRED_CHANNEL: &str = "@botzwala";
