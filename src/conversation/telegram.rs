//! Telegram client using teloxide.

use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, MessageEntity, MessageEntityKind, MessageId,
};
use tracing::{debug, warn};

use super::controller::ChatTransport;
use super::menu::Button;

/// Telegram API client.
#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// One button per row, in the given order.
pub fn menu_keyboard(buttons: &[Button]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        buttons
            .iter()
            .map(|b| vec![InlineKeyboardButton::callback(b.label(), b.callback_data())]),
    )
}

/// True when Telegram tagged a bot command at the very start of the message.
/// A bare "/" or "/ Alien" carries no such entity and is searched like any other text.
pub fn starts_with_bot_command(entities: &[MessageEntity]) -> bool {
    entities
        .iter()
        .any(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand))
}

/// A user's private chat shares the user's id.
pub fn private_chat(user_id: UserId) -> ChatId {
    ChatId::from(user_id)
}

impl ChatTransport for TelegramClient {
    // No parse mode: titles and plots are sent as raw text.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), String> {
        self.bot
            .send_message(chat_id, text)
            .await
            .map(|msg| debug!("Sent msg {} to chat {}", msg.id.0, chat_id.0))
            .map_err(|e| {
                let msg = format!("Failed to send: {e}");
                warn!("{}", msg);
                msg
            })
    }

    async fn send_menu(&self, chat_id: ChatId, text: &str, buttons: &[Button]) -> Result<(), String> {
        self.bot
            .send_message(chat_id, text)
            .reply_markup(menu_keyboard(buttons))
            .await
            .map(|msg| debug!("Sent menu {} to chat {}", msg.id.0, chat_id.0))
            .map_err(|e| {
                let msg = format!("Failed to send menu: {e}");
                warn!("{}", msg);
                msg
            })
    }

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<(), String> {
        self.bot
            .edit_message_text(chat_id, message_id, text)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to edit message: {e}");
                warn!("{}", msg);
                msg
            })
    }
}
