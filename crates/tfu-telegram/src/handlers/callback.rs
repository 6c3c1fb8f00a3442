use teloxide::types::CallbackQuery as TgCallbackQuery;

use tfu_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::{CallbackQuery, IncomingUpdate},
};

pub(super) fn to_incoming(q: TgCallbackQuery) -> IncomingUpdate {
    let user_id = q.from.id.0 as i64;
    let message = q.message.as_ref().map(|m| MessageRef {
        chat_id: ChatId(m.chat.id.0),
        message_id: MessageId(m.id.0),
    });
    // Without the keyboard message, reply in the user's private chat.
    let chat_id = message.map(|m| m.chat_id).unwrap_or(ChatId(user_id));

    IncomingUpdate::Callback(CallbackQuery {
        chat_id,
        user_id: UserId(user_id),
        username: q.from.username.clone(),
        callback_id: q.id,
        data: q.data.unwrap_or_default(),
        message,
    })
}
