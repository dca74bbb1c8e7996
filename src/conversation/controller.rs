//! Reply logic for the three inbound event kinds: `/start`, button presses and free text.

use std::future::Future;

use teloxide::types::{ChatId, MessageId, UserId};
use tracing::{debug, error, info, warn};

use super::menu::Button;
use super::session::{SessionMode, SessionStore};
use crate::omdb::MovieLookup;

pub const MENU_TEXT: &str = "Choose an action:";
pub const SEARCH_ERROR_REPLY: &str = "An error occurred during search";

/// Outbound side of the chat platform.
pub trait ChatTransport: Send + Sync {
    fn send_text(&self, chat_id: ChatId, text: &str) -> impl Future<Output = Result<(), String>> + Send;

    /// Send `text` with one inline button per row.
    fn send_menu(
        &self,
        chat_id: ChatId,
        text: &str,
        buttons: &[Button],
    ) -> impl Future<Output = Result<(), String>> + Send;

    fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> impl Future<Output = Result<(), String>> + Send;
}

/// A callback query, already acknowledged by the adapter.
#[derive(Debug, Clone)]
pub struct ButtonPress {
    pub user_id: UserId,
    pub chat_id: ChatId,
    /// The menu message, when Telegram still lets us edit it.
    pub message_id: Option<MessageId>,
    pub data: String,
}

pub struct Controller<T, L> {
    transport: T,
    lookup: L,
    sessions: SessionStore,
}

impl<T: ChatTransport, L: MovieLookup> Controller<T, L> {
    pub fn new(transport: T, lookup: L) -> Self {
        Self {
            transport,
            lookup,
            sessions: SessionStore::new(),
        }
    }

    /// `/start`: show the menu. The stored mode is left alone.
    pub async fn handle_start(&self, chat_id: ChatId) {
        info!("📋 Menu requested in chat {}", chat_id.0);
        if let Err(e) = self.transport.send_menu(chat_id, MENU_TEXT, &Button::ALL).await {
            warn!("Failed to send menu: {e}");
        }
    }

    pub async fn handle_button(&self, press: ButtonPress) {
        let Some(button) = Button::from_callback_data(&press.data) else {
            debug!("Ignoring unknown callback data {:?} from {}", press.data, press.user_id);
            return;
        };

        let mode = match button {
            Button::SearchMovie => SessionMode::Movie,
            Button::SearchBook => SessionMode::Book,
        };
        self.sessions.set(press.user_id, mode).await;
        info!("🔘 User {} selected {:?}", press.user_id, mode);

        let result = match press.message_id {
            Some(message_id) => {
                self.transport
                    .edit_text(press.chat_id, message_id, button.prompt())
                    .await
            }
            None => self.transport.send_text(press.chat_id, button.prompt()).await,
        };
        if let Err(e) = result {
            warn!("Failed to show prompt: {e}");
        }
    }

    /// Free text is always searched as a movie title, whatever mode the user picked.
    /// Commands never get here; the adapter filters them by message entity.
    pub async fn handle_text(&self, user_id: UserId, chat_id: ChatId, text: &str) {
        let mode = self.sessions.get(user_id).await;
        if mode == SessionMode::Book {
            // No book source exists yet; book mode falls through to the movie search.
            debug!("User {} is in book mode, searching movies anyway", user_id);
        }
        let text_preview: String = text.chars().take(100).collect();
        info!("💬 Query from {} ({:?}): \"{text_preview}\"", user_id, mode);

        let reply = match self.lookup.lookup(text).await {
            Ok(result) => result.reply_text(),
            Err(e) => {
                error!("Movie search failed: {e}");
                SEARCH_ERROR_REPLY.to_string()
            }
        };

        if let Err(e) = self.transport.send_text(chat_id, &reply).await {
            warn!("Failed to send search reply: {e}");
        }
    }

    #[cfg(test)]
    pub async fn session_mode(&self, user_id: UserId) -> SessionMode {
        self.sessions.get(user_id).await
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[cfg(test)]
    pub fn lookup(&self) -> &L {
        &self.lookup
    }
}
