//! Alert composition and delivery.
//!
//! - `AlertComposer`: renders a confluence evaluation as a Markdown message
//! - `Notifier`: dyn-compatible transport trait
//! - `TelegramNotifier`: Bot API `sendMessage`
//! - `DryRunNotifier`: logs instead of sending when no destination is configured

pub mod composer;
pub mod error;
pub mod notifier;
pub mod telegram;

pub use composer::AlertComposer;
pub use error::{NotifyError, NotifyResult};
pub use notifier::{BoxFuture, DryRunNotifier, MockNotifier, Notifier};
pub use telegram::{TelegramConfig, TelegramNotifier, DEFAULT_TELEGRAM_URL};
