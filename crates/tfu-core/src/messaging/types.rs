use crate::{
    domain::{ChatId, MessageRef, UserId},
    intent::CallbackPayload,
    languages::{LanguageRegistry, BACK_LABEL},
};

/// Cross-messenger incoming update model.
///
/// Telegram-specific fields should live in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Message(IncomingMessage),
    Callback(CallbackQuery),
}

impl IncomingUpdate {
    pub fn user_id(&self) -> UserId {
        match self {
            IncomingUpdate::Message(m) => m.user_id,
            IncomingUpdate::Callback(q) => q.user_id,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        match self {
            IncomingUpdate::Message(m) => m.chat_id,
            IncomingUpdate::Callback(q) => q.chat_id,
        }
    }
}

/// A text message or a captioned media message.
#[derive(Clone, Debug)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub text: Option<String>,
    pub caption: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub callback_id: String,
    pub data: String,
    /// The message carrying the keyboard, if Telegram still exposes it.
    pub message: Option<MessageRef>,
}

/// Inline keyboard (buttons) answered through callback queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
    pub per_row: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    pub fn new(buttons: Vec<InlineButton>, per_row: usize) -> Self {
        Self {
            buttons,
            per_row: per_row.max(1),
        }
    }

    /// One `SETLANG|<code>` button per registry entry, two per row.
    pub fn languages(registry: &LanguageRegistry) -> Self {
        let buttons = registry
            .iter()
            .map(|l| InlineButton {
                label: format!("{} – {}", l.code, l.name),
                callback_data: CallbackPayload::set_language_data(&l.code),
            })
            .collect();
        Self::new(buttons, 2)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[InlineButton]> {
        self.buttons.chunks(self.per_row.max(1))
    }
}

/// Quick-reply keyboard; tapping a button sends its label as a text message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
}

impl ReplyKeyboard {
    /// Registry labels two per row, followed by the fixed Back entry.
    pub fn language_picker(registry: &LanguageRegistry) -> Self {
        let labels: Vec<String> = registry.iter().map(|l| l.label()).collect();
        let mut rows: Vec<Vec<String>> = labels.chunks(2).map(|c| c.to_vec()).collect();
        rows.push(vec![BACK_LABEL.to_string()]);
        Self { rows }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ReplyMarkup {
    #[default]
    None,
    Keyboard(ReplyKeyboard),
    Inline(InlineKeyboard),
}

/// One outbound reply: HTML text plus optional markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub html: String,
    pub markup: ReplyMarkup,
}

impl Reply {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            markup: ReplyMarkup::None,
        }
    }

    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.markup = markup;
        self
    }
}

/// Limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub max_message_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picker_ends_with_back_row() {
        let reg = LanguageRegistry::parse("en:English:🇬🇧,es:Spanish:🇪🇸,my:Myanmar:🇲🇲").unwrap();
        let kb = ReplyKeyboard::language_picker(&reg);
        assert_eq!(
            kb.rows,
            vec![
                vec!["🇬🇧 English".to_string(), "🇪🇸 Spanish".to_string()],
                vec!["🇲🇲 Myanmar".to_string()],
                vec![BACK_LABEL.to_string()],
            ]
        );
    }

    #[test]
    fn inline_languages_use_setlang_payload() {
        let reg = LanguageRegistry::parse("en:English,es:Spanish,fr:French").unwrap();
        let kb = InlineKeyboard::languages(&reg);
        let rows: Vec<usize> = kb.rows().map(|r| r.len()).collect();
        assert_eq!(rows, vec![2, 1]);
        assert_eq!(kb.buttons[1].callback_data, "SETLANG|es");
        assert_eq!(kb.buttons[1].label, "es – Spanish");
    }
}
