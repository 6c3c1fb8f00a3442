use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{domain::UserId, languages::LanguageCode};

/// Per-user preferences.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserSession {
    /// `None` means "use the configured default".
    pub target_lang: Option<LanguageCode>,
}

/// Preference store.
///
/// Every read-modify-write is atomic per user. The in-memory implementation below keeps
/// state for the process lifetime only; a durable store can be swapped in behind this trait.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current session for `user`, created on first access.
    async fn get(&self, user: UserId) -> UserSession;

    /// Set (or clear, with `None`) the target language; returns the updated session.
    async fn set_target_lang(&self, user: UserId, lang: Option<LanguageCode>) -> UserSession;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<UserId, UserSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, user: UserId) -> UserSession {
        let mut map = self.sessions.lock().await;
        map.entry(user).or_default().clone()
    }

    async fn set_target_lang(&self, user: UserId, lang: Option<LanguageCode>) -> UserSession {
        let mut map = self.sessions.lock().await;
        let session = map.entry(user).or_default();
        session.target_lang = lang;
        session.clone()
    }
}
