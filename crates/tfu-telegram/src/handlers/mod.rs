//! Telegram update handlers.
//!
//! Each handler is a thin adapter that:
//! - converts the teloxide update into a core `IncomingUpdate`
//! - serializes per user
//! - runs the core router, turning a panic into the generic failure reply

use std::{future::Future, sync::Arc};

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};
use tracing::{debug, error};

use tfu_core::{
    domain::ChatId,
    formatting::GENERIC_FAILURE,
    messaging::{port::MessagingPort, types::IncomingUpdate},
};

use crate::router::AppState;

mod callback;
mod message;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let update = callback::to_incoming(q);
    dispatch(state, update).await;
    Ok(())
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    match message::to_incoming(&msg) {
        Some(update) => dispatch(state, update).await,
        None => debug!(chat_id = msg.chat.id.0, "ignoring message without a sender"),
    }
    Ok(())
}

async fn dispatch(state: Arc<AppState>, update: IncomingUpdate) {
    let user_id = update.user_id().0;
    let chat_id = update.chat_id();
    let _guard = state.user_locks.lock_user(user_id).await;

    let router = state.router.clone();
    run_isolated(
        async move { router.handle(update).await },
        state.messenger.as_ref(),
        chat_id,
    )
    .await;
}

/// Run one event on its own task. A panic is logged and answered with the generic notice.
async fn run_isolated<F>(event: F, messenger: &dyn MessagingPort, chat_id: ChatId)
where
    F: Future<Output = ()> + Send + 'static,
{
    let Err(e) = tokio::spawn(event).await else {
        return;
    };
    error!(chat_id = chat_id.0, error = %e, "event handler crashed");
    if e.is_panic() {
        if let Err(e) = messenger.send_html(chat_id, GENERIC_FAILURE).await {
            error!(chat_id = chat_id.0, error = %e, "failed to send failure notice");
        }
    }
}
