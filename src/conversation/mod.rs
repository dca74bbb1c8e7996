//! Conversation module - menu, per-user search mode and the reply logic.

pub mod controller;
pub mod menu;
pub mod session;
pub mod telegram;


pub use controller::{ButtonPress, Controller};
pub use menu::Command;
pub use telegram::TelegramClient;
