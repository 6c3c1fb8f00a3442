//! Language registry: the target languages the bot offers, in presentation order.

use std::{fmt, sync::OnceLock};

use regex::Regex;

use crate::{errors::Error, Result};

/// Source hint that asks the provider to detect the input language.
pub const SOURCE_AUTO: &str = "auto";

/// Label of the fixed picker entry that clears the stored preference.
pub const BACK_LABEL: &str = "⬅️ Back";

const BUILTIN: &[(&str, &str, &str)] = &[
    ("en", "English", "🇬🇧"),
    ("zh", "Chinese", "🇨🇳"),
    ("es", "Spanish", "🇪🇸"),
    ("fr", "French", "🇫🇷"),
    ("de", "German", "🇩🇪"),
    ("ja", "Japanese", "🇯🇵"),
    ("ko", "Korean", "🇰🇷"),
    ("ru", "Russian", "🇷🇺"),
    ("th", "Thai", "🇹🇭"),
    ("vi", "Vietnamese", "🇻🇳"),
    ("hi", "Hindi", "🇮🇳"),
    ("ar", "Arabic", "🇸🇦"),
    ("pt", "Portuguese", "🇵🇹"),
    ("it", "Italian", "🇮🇹"),
    ("id", "Indonesian", "🇮🇩"),
    ("my", "Myanmar", "🇲🇲"),
];

/// A registry-backed language code (lowercase).
///
/// Only [`LanguageRegistry::code`] hands these out, so holding one means the code is a
/// valid translation target.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `zh-tw` -> `zh`.
    pub fn primary_subtag(&self) -> &str {
        primary_subtag(&self.0)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Language {
    pub code: LanguageCode,
    pub name: String,
    pub flag: Option<String>,
}

impl Language {
    /// Label shown on picker buttons; tapping one sends this exact text back.
    pub fn label(&self) -> String {
        match &self.flag {
            Some(flag) => format!("{flag} {}", self.name),
            None => format!("{} – {}", self.code, self.name),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
}

impl LanguageRegistry {
    /// Build a registry from `(code, name, flag)` entries, keeping their order.
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String, Option<String>)>,
    {
        let mut languages: Vec<Language> = Vec::new();
        for (code, name, flag) in entries {
            let code = code.trim().to_lowercase();
            if code == SOURCE_AUTO {
                return Err(Error::Config(
                    "\"auto\" is a source hint and cannot be a target language".to_string(),
                ));
            }
            if !is_plausible_code(&code) {
                return Err(Error::Config(format!("invalid language code: {code:?}")));
            }
            if languages.iter().any(|l| l.code.0 == code) {
                return Err(Error::Config(format!("duplicate language code: {code}")));
            }
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(Error::Config(format!("language {code} has no name")));
            }
            languages.push(Language {
                code: LanguageCode(code),
                name,
                flag: flag.map(|f| f.trim().to_string()).filter(|f| !f.is_empty()),
            });
        }

        if languages.is_empty() {
            return Err(Error::Config("language registry is empty".to_string()));
        }
        Ok(Self { languages })
    }

    pub fn builtin() -> Self {
        Self {
            languages: BUILTIN
                .iter()
                .map(|(code, name, flag)| Language {
                    code: LanguageCode((*code).to_string()),
                    name: (*name).to_string(),
                    flag: Some((*flag).to_string()),
                })
                .collect(),
        }
    }

    /// Parse the `LANGUAGES` config format: `code:Name[:flag]` entries separated by commas.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for raw in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let mut parts = raw.splitn(3, ':');
            let code = parts.next().unwrap_or("").to_string();
            let Some(name) = parts.next() else {
                return Err(Error::Config(format!(
                    "language entry {raw:?} must look like code:Name[:flag]"
                )));
            };
            let flag = parts.next().map(str::to_string);
            entries.push((code, name.to_string(), flag));
        }
        Self::new(entries)
    }

    pub fn get(&self, code: &str) -> Option<&Language> {
        let code = code.trim();
        self.languages
            .iter()
            .find(|l| l.code.0.eq_ignore_ascii_case(code))
    }

    /// Validate a raw code against the registry.
    pub fn code(&self, raw: &str) -> Option<LanguageCode> {
        self.get(raw).map(|l| l.code.clone())
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.get(raw).is_some()
    }

    /// Display name for a code, falling back to the code itself.
    pub fn name_of(&self, code: &LanguageCode) -> String {
        self.get(code.as_str())
            .map(|l| l.name.clone())
            .unwrap_or_else(|| code.to_string())
    }

    /// Reverse lookup from a picker label.
    pub fn by_label(&self, label: &str) -> Option<LanguageCode> {
        self.languages
            .iter()
            .find(|l| l.label() == label)
            .map(|l| l.code.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Language> {
        self.languages.iter()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn codes_csv(&self) -> String {
        self.languages
            .iter()
            .map(|l| l.code.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Syntactic check only (`en`, `fil`, `zh-tw`); registry membership is checked separately.
pub fn is_plausible_code(raw: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?i)[a-z]{2,3}(-[a-z0-9]{2,4})?$").expect("valid regex"))
        .is_match(raw)
}

pub(crate) fn primary_subtag(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_keeps_presentation_order() {
        let reg = LanguageRegistry::builtin();
        let codes: Vec<&str> = reg.iter().take(3).map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["en", "zh", "es"]);
        assert!(reg.contains("my"));
        assert!(!reg.contains("auto"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let reg = LanguageRegistry::builtin();
        assert_eq!(reg.code("ES").unwrap().as_str(), "es");
        assert!(reg.code("xx").is_none());
    }

    #[test]
    fn parse_accepts_optional_flag() {
        let reg = LanguageRegistry::parse("en:English:🇬🇧, my:Myanmar").unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get("en").unwrap().label(), "🇬🇧 English");
        assert_eq!(reg.get("my").unwrap().label(), "my – Myanmar");
    }

    #[test]
    fn parse_rejects_auto_and_duplicates() {
        assert!(LanguageRegistry::parse("auto:Detect").is_err());
        assert!(LanguageRegistry::parse("en:English,en:Again").is_err());
        assert!(LanguageRegistry::parse("english").is_err());
        assert!(LanguageRegistry::parse("").is_err());
    }

    #[test]
    fn labels_round_trip_to_codes() {
        let reg = LanguageRegistry::builtin();
        for lang in reg.iter() {
            assert_eq!(reg.by_label(&lang.label()), Some(lang.code.clone()));
        }
        assert!(reg.by_label(BACK_LABEL).is_none());
    }

    #[test]
    fn plausible_codes() {
        assert!(is_plausible_code("en"));
        assert!(is_plausible_code("zh-TW"));
        assert!(is_plausible_code("fil"));
        assert!(!is_plausible_code("e"));
        assert!(!is_plausible_code("english"));
        assert!(!is_plausible_code("en us"));
    }
}
