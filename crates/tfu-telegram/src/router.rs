use std::{collections::HashMap, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use tfu_core::messaging::throttled::ThrottledMessenger;
use tfu_core::{
    config::Config,
    messaging::port::MessagingPort,
    ports::{LanguageDetector, Translator},
    router::Router,
    session::{MemorySessionStore, SessionStore},
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
    pub messenger: Arc<dyn MessagingPort>,
    pub user_locks: Arc<UserLocks>,
}

/// Serializes events per user so a quick `/setlang` is applied before the next message.
#[derive(Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub async fn lock_user(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub async fn run_polling(
    cfg: Arc<Config>,
    translator: Arc<dyn Translator>,
    detector: Arc<dyn LanguageDetector>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => info!(username = %me.username(), "bot started"),
        Err(e) => warn!(error = %e, "get_me failed; continuing"),
    }
    info!(
        languages = cfg.languages.len(),
        default_lang = %cfg.default_lang,
        admins = cfg.admins.len(),
        "configuration loaded"
    );

    // Throttle outbound calls (broadcast fan-out is the burst case). 429 RetryAfter is still
    // retried once in the Telegram adapter.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> =
        Arc::new(ThrottledMessenger::new(raw_messenger, cfg.throttle));

    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let router = Arc::new(Router::new(
        &cfg,
        translator,
        detector,
        sessions,
        messenger.clone(),
    ));

    let state = Arc::new(AppState {
        router,
        messenger,
        user_locks: Arc::new(UserLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("dispatcher stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_user_waits_other_users_do_not() {
        let locks = Arc::new(UserLocks::default());
        let held = locks.lock_user(1).await;

        let other = tokio::time::timeout(Duration::from_millis(50), locks.lock_user(2)).await;
        assert!(other.is_ok());

        let same = tokio::time::timeout(Duration::from_millis(50), locks.lock_user(1)).await;
        assert!(same.is_err());

        drop(held);
        let again = tokio::time::timeout(Duration::from_millis(50), locks.lock_user(1)).await;
        assert!(again.is_ok());
    }
}
