//! Telegram adapter (teloxide).
//!
//! This crate implements the `tfu-core` MessagingPort over Telegram Bot API.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ParseMode,
        ReplyMarkup as TgReplyMarkup,
    },
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use tfu_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{MessagingCapabilities, Reply, ReplyMarkup},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

/// Render core markup as Telegram markup.
pub fn tg_markup(markup: &ReplyMarkup) -> Option<TgReplyMarkup> {
    match markup {
        ReplyMarkup::None => None,
        ReplyMarkup::Keyboard(kb) => {
            let rows: Vec<Vec<KeyboardButton>> = kb
                .rows
                .iter()
                .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone())).collect())
                .collect();
            Some(TgReplyMarkup::Keyboard(
                KeyboardMarkup::new(rows).resize_keyboard(true),
            ))
        }
        ReplyMarkup::Inline(kb) => {
            let rows: Vec<Vec<InlineKeyboardButton>> = kb
                .rows()
                .map(|row| {
                    row.iter()
                        .map(|b| {
                            InlineKeyboardButton::callback(b.label.clone(), b.callback_data.clone())
                        })
                        .collect()
                })
                .collect();
            Some(TgReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(
                rows,
            )))
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 4096,
        }
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.send_reply(chat_id, &Reply::html(html)).await
    }

    async fn send_reply(&self, chat_id: ChatId, reply: &Reply) -> Result<MessageRef> {
        let markup = tg_markup(&reply.markup);
        let msg = self
            .with_retry(|| {
                let req = self
                    .bot
                    .send_message(Self::tg_chat(chat_id), reply.html.clone())
                    .parse_mode(ParseMode::Html);
                match &markup {
                    Some(m) => req.reply_markup(m.clone()),
                    None => req,
                }
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .edit_message_text(
                    Self::tg_chat(msg.chat_id),
                    Self::tg_msg_id(msg.message_id),
                    html.to_string(),
                )
                .parse_mode(ParseMode::Html)
        })
        .await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.with_retry(|| {
            let mut req = self.bot.answer_callback_query(callback_id.to_string());
            if let Some(t) = text {
                req = req.text(t.to_string());
            }
            req
        })
        .await?;
        Ok(())
    }
}
