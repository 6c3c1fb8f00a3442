//! Command parsing: raw message text (or caption) into a single [`Intent`].
//!
//! Parsing is total. Every input maps to exactly one intent, and wrong argument
//! shapes become [`Intent::MalformedCommand`] rather than errors.

use std::sync::Arc;

use crate::{
    errors::Error,
    languages::{is_plausible_code, LanguageCode, LanguageRegistry, BACK_LABEL},
    Result,
};

pub const USAGE_TR: &str = "/tr <lang> <text>";
pub const USAGE_TRANSLATE: &str = "/translate <text>";
pub const USAGE_SETLANG: &str = "/setlang <code>";
pub const USAGE_BROADCAST: &str = "/broadcast <text>";

/// Tag of the inline-keyboard callback payload `SETLANG|<code>`.
pub const CALLBACK_SETLANG: &str = "SETLANG";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    PlainText { body: String },
    ExplicitTranslate { lang: String, body: String },
    SetLanguage { code: String },
    Reset,
    Broadcast { body: String },
    ShowWelcome,
    ShowHelp,
    ShowLanguages,
    Empty,
    MalformedCommand { usage_hint: String },
}

impl Intent {
    /// Short name for logs (never includes message content).
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::PlainText { .. } => "plain_text",
            Intent::ExplicitTranslate { .. } => "explicit_translate",
            Intent::SetLanguage { .. } => "set_language",
            Intent::Reset => "reset",
            Intent::Broadcast { .. } => "broadcast",
            Intent::ShowWelcome => "welcome",
            Intent::ShowHelp => "help",
            Intent::ShowLanguages => "languages",
            Intent::Empty => "empty",
            Intent::MalformedCommand { .. } => "malformed",
        }
    }

    fn malformed(usage_hint: &str) -> Self {
        Intent::MalformedCommand {
            usage_hint: usage_hint.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CommandParser {
    registry: Arc<LanguageRegistry>,
}

impl CommandParser {
    pub fn new(registry: Arc<LanguageRegistry>) -> Self {
        Self { registry }
    }

    pub fn parse(&self, text: Option<&str>, caption: Option<&str>) -> Intent {
        let Some(raw) = non_blank(text).or_else(|| non_blank(caption)) else {
            return Intent::Empty;
        };
        let text = raw.trim();

        if let Some(code) = self.registry.by_label(text) {
            return Intent::SetLanguage {
                code: code.to_string(),
            };
        }
        if text == BACK_LABEL {
            return Intent::Reset;
        }
        if text.starts_with('/') {
            if let Some(intent) = self.parse_command(text) {
                return intent;
            }
        }

        Intent::PlainText {
            body: text.to_string(),
        }
    }

    fn parse_command(&self, text: &str) -> Option<Intent> {
        let (cmd, rest) = split_command(text);
        let intent = match cmd.as_str() {
            "tr" => parse_tr(rest),
            "translate" => self.parse_translate(rest),
            "setlang" => parse_setlang(rest),
            "broadcast" => Intent::Broadcast {
                body: rest.to_string(),
            },
            "start" => Intent::ShowWelcome,
            "help" => Intent::ShowHelp,
            "languages" => Intent::ShowLanguages,
            _ => return None,
        };
        Some(intent)
    }

    /// `/translate <text>` uses the stored preference; `/translate <code> <text>` is
    /// accepted as the explicit form when the first word is a registry code.
    fn parse_translate(&self, rest: &str) -> Intent {
        if rest.is_empty() {
            return Intent::malformed(USAGE_TRANSLATE);
        }
        if let Some((lang, body)) = split_first_word(rest) {
            if self.registry.contains(lang) && !body.is_empty() {
                return Intent::ExplicitTranslate {
                    lang: lang.to_string(),
                    body: body.to_string(),
                };
            }
        }
        Intent::PlainText {
            body: rest.to_string(),
        }
    }
}

fn parse_tr(rest: &str) -> Intent {
    match split_first_word(rest) {
        Some((lang, body)) if !body.is_empty() => Intent::ExplicitTranslate {
            lang: lang.to_string(),
            body: body.to_string(),
        },
        _ => Intent::malformed(USAGE_TR),
    }
}

fn parse_setlang(rest: &str) -> Intent {
    let args: Vec<&str> = rest.split_whitespace().collect();
    match args.as_slice() {
        [code] if is_plausible_code(code) => Intent::SetLanguage {
            code: code.to_lowercase(),
        },
        _ => Intent::malformed(USAGE_SETLANG),
    }
}

/// Split `/cmd@botname rest...` into (`cmd`, `rest`).
///
/// The command is lowercased; `rest` starts at the first non-space character and keeps
/// its internal whitespace.
fn split_command(text: &str) -> (String, &str) {
    let (first, rest) = match text.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (text, ""),
    };
    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();
    (cmd, rest)
}

fn split_first_word(s: &str) -> Option<(&str, &str)> {
    if s.is_empty() {
        return None;
    }
    match s.split_once(char::is_whitespace) {
        Some((word, tail)) => Some((word, tail.trim_start())),
        None => Some((s, "")),
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// Typed form of inline-keyboard callback data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackPayload {
    SetLanguage(LanguageCode),
}

impl CallbackPayload {
    /// Parse `SETLANG|<code>`, validating the code against the registry.
    pub fn parse(data: &str, registry: &LanguageRegistry) -> Result<Self> {
        let Some((tag, code)) = data.split_once('|') else {
            return Err(Error::malformed(format!("{CALLBACK_SETLANG}|<code>")));
        };
        if tag != CALLBACK_SETLANG {
            return Err(Error::malformed(format!("{CALLBACK_SETLANG}|<code>")));
        }
        registry
            .code(code)
            .map(CallbackPayload::SetLanguage)
            .ok_or_else(|| Error::UnknownLanguageCode(code.to_string()))
    }

    pub fn set_language_data(code: &LanguageCode) -> String {
        format!("{CALLBACK_SETLANG}|{code}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> CommandParser {
        CommandParser::new(Arc::new(LanguageRegistry::builtin()))
    }

    fn parse(text: &str) -> Intent {
        parser().parse(Some(text), None)
    }

    #[test]
    fn tr_with_lang_and_body() {
        assert_eq!(
            parse("/tr es Hello"),
            Intent::ExplicitTranslate {
                lang: "es".to_string(),
                body: "Hello".to_string()
            }
        );
    }

    #[test]
    fn tr_body_keeps_internal_whitespace() {
        let bodies = ["Hello world", "a  b   c", "line one\nline two", "what's up?"];
        for lang in ["es", "fr", "xx"] {
            for body in bodies {
                let intent = parse(&format!("/tr {lang} {body}"));
                assert_eq!(
                    intent,
                    Intent::ExplicitTranslate {
                        lang: lang.to_string(),
                        body: body.to_string()
                    }
                );
            }
        }
    }

    #[test]
    fn tr_with_missing_arguments_is_malformed() {
        for text in ["/tr", "/tr es", "/tr   es   "] {
            assert_eq!(
                parse(text),
                Intent::MalformedCommand {
                    usage_hint: USAGE_TR.to_string()
                },
                "{text:?}"
            );
        }
    }

    #[test]
    fn tr_accepts_bot_mention() {
        assert_eq!(
            parse("/tr@TranslateForUBot de Guten Tag"),
            Intent::ExplicitTranslate {
                lang: "de".to_string(),
                body: "Guten Tag".to_string()
            }
        );
    }

    #[test]
    fn tr_prefix_does_not_swallow_other_words() {
        // `/trivia` is not `/tr`.
        assert_eq!(
            parse("/trivia night"),
            Intent::PlainText {
                body: "/trivia night".to_string()
            }
        );
    }

    #[test]
    fn translate_uses_preference_unless_code_given() {
        assert_eq!(
            parse("/translate good morning"),
            Intent::PlainText {
                body: "good morning".to_string()
            }
        );
        assert_eq!(
            parse("/translate ja good morning"),
            Intent::ExplicitTranslate {
                lang: "ja".to_string(),
                body: "good morning".to_string()
            }
        );
        assert_eq!(
            parse("/translate"),
            Intent::MalformedCommand {
                usage_hint: USAGE_TRANSLATE.to_string()
            }
        );
    }

    #[test]
    fn setlang_requires_one_plausible_code() {
        assert_eq!(
            parse("/setlang FR"),
            Intent::SetLanguage {
                code: "fr".to_string()
            }
        );
        // Plausible but unknown codes are left for the resolver to reject.
        assert_eq!(
            parse("/setlang xx"),
            Intent::SetLanguage {
                code: "xx".to_string()
            }
        );
        for text in ["/setlang", "/setlang en fr", "/setlang english"] {
            assert_eq!(
                parse(text),
                Intent::MalformedCommand {
                    usage_hint: USAGE_SETLANG.to_string()
                },
                "{text:?}"
            );
        }
    }

    #[test]
    fn broadcast_keeps_body_possibly_empty() {
        assert_eq!(
            parse("/broadcast Maintenance at 10pm"),
            Intent::Broadcast {
                body: "Maintenance at 10pm".to_string()
            }
        );
        assert_eq!(
            parse("/broadcast"),
            Intent::Broadcast {
                body: String::new()
            }
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("/help"), Intent::ShowHelp);
        assert_eq!(parse("/languages"), Intent::ShowLanguages);
        assert_eq!(parse("/start"), Intent::ShowWelcome);
        assert_eq!(parse("/start ref42"), Intent::ShowWelcome);
    }

    #[test]
    fn info_commands_ignore_arguments() {
        assert_eq!(parse("/help me"), Intent::ShowHelp);
        assert_eq!(parse("/languages all"), Intent::ShowLanguages);
        assert_eq!(parse("/HELP@tfu_bot please"), Intent::ShowHelp);
    }

    #[test]
    fn picker_labels_and_back() {
        let reg = LanguageRegistry::builtin();
        let label = reg.get("ja").unwrap().label();
        assert_eq!(
            parse(&label),
            Intent::SetLanguage {
                code: "ja".to_string()
            }
        );
        assert_eq!(parse(BACK_LABEL), Intent::Reset);
    }

    #[test]
    fn caption_is_used_when_text_is_absent() {
        let p = parser();
        assert_eq!(
            p.parse(None, Some("Bonjour")),
            Intent::PlainText {
                body: "Bonjour".to_string()
            }
        );
        assert_eq!(
            p.parse(Some("  "), Some("Bonjour")),
            Intent::PlainText {
                body: "Bonjour".to_string()
            }
        );
        assert_eq!(
            p.parse(Some("Hello"), Some("Bonjour")),
            Intent::PlainText {
                body: "Hello".to_string()
            }
        );
        assert_eq!(p.parse(None, None), Intent::Empty);
        assert_eq!(p.parse(Some(""), Some(" \n")), Intent::Empty);
    }

    #[test]
    fn callback_payload_validates_code() {
        let reg = LanguageRegistry::builtin();
        assert_eq!(
            CallbackPayload::parse("SETLANG|fr", &reg).unwrap(),
            CallbackPayload::SetLanguage(reg.code("fr").unwrap())
        );
        assert!(matches!(
            CallbackPayload::parse("SETLANG|xx", &reg),
            Err(Error::UnknownLanguageCode(c)) if c == "xx"
        ));
        assert!(matches!(
            CallbackPayload::parse("askuser:1:2", &reg),
            Err(Error::MalformedCommand { .. })
        ));
        assert!(matches!(
            CallbackPayload::parse("OTHER|fr", &reg),
            Err(Error::MalformedCommand { .. })
        ));
    }
}
