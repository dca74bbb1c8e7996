//! Per-user search mode, kept in memory only.

use std::collections::HashMap;

use teloxide::types::UserId;
use tokio::sync::Mutex;

/// Which search flow the user last picked from the menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionMode {
    #[default]
    Unset,
    Movie,
    Book,
}

/// Modes keyed by user. Entries are never removed; a restart forgets everything.
#[derive(Default)]
pub struct SessionStore {
    modes: Mutex<HashMap<UserId, SessionMode>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, user_id: UserId, mode: SessionMode) {
        self.modes.lock().await.insert(user_id, mode);
    }

    pub async fn get(&self, user_id: UserId) -> SessionMode {
        self.modes
            .lock()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or_default()
    }
}
