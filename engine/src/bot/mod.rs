//! Telegram bot side of the mini app
//!
//! The bot opens the pages as web apps and receives the payloads they send
//! back through the [`inbox`].

pub mod career;
pub mod inbox;
pub mod telegram;

pub use career::CAREER_PATHS;
pub use inbox::Inbox;
pub use telegram::TelegramBot;
