use teloxide::types::Message;

use tfu_core::{
    domain::{ChatId, UserId},
    messaging::types::{IncomingMessage, IncomingUpdate},
};

/// Text and captioned media become core messages; senderless posts are skipped.
pub(super) fn to_incoming(msg: &Message) -> Option<IncomingUpdate> {
    let user = msg.from()?;
    Some(IncomingUpdate::Message(IncomingMessage {
        chat_id: ChatId(msg.chat.id.0),
        user_id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
    }))
}
