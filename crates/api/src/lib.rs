//! External service clients.
//!
//! - [`PythClient`]: USD spot prices from the Pyth Hermes endpoint
//! - [`TelegramNotifier`]: alert and log delivery over Telegram bots

mod pyth;
mod telegram;

pub use pyth::{OracleError, PythClient};
pub use telegram::{Notifier, TelegramNotifier};
