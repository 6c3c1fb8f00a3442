use std::{env, fs, path::Path, sync::Arc, time::Duration};

use tracing::warn;

use crate::{
    broadcast::AdminSet,
    errors::Error,
    languages::{LanguageCode, LanguageRegistry},
    messaging::throttled::ThrottleConfig,
    resolver::ResolverConfig,
    Result,
};

/// Typed configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,
    pub admins: AdminSet,

    // Languages
    pub languages: Arc<LanguageRegistry>,
    pub default_lang: LanguageCode,
    pub fallback_lang: LanguageCode,
    pub auto_detect_reverse: bool,
    pub auto_detect_min_chars: usize,

    // Provider
    pub translate_timeout: Duration,
    pub google_endpoint: String,

    // Outbound rate limiting
    pub throttle: ThrottleConfig,
}

impl Config {
    /// Load from the process environment, after applying `.env` if present.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required
        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN")
            .or_else(|| get("BOT_TOKEN"))
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;

        // Admins (malformed entries are dropped, not fatal)
        let (admins, rejected) = AdminSet::parse_csv(&get("ADMIN_IDS").unwrap_or_default());
        for entry in &rejected {
            warn!(entry = %entry, "ignoring malformed ADMIN_IDS entry");
        }

        // Languages
        let languages = match get("LANGUAGES") {
            Some(spec) => LanguageRegistry::parse(&spec)?,
            None => LanguageRegistry::builtin(),
        };
        let default_lang = registry_code(&languages, "DEFAULT_LANG", get("DEFAULT_LANG"), "my")?;
        let fallback_lang =
            registry_code(&languages, "FALLBACK_LANG", get("FALLBACK_LANG"), "en")?;
        let auto_detect_reverse = parse_bool("AUTO_DETECT_REVERSE", get("AUTO_DETECT_REVERSE"))?
            .unwrap_or(true);
        let auto_detect_min_chars =
            parse_num::<usize>("AUTO_DETECT_MIN_CHARS", get("AUTO_DETECT_MIN_CHARS"))?
                .unwrap_or(4);

        // Provider
        let translate_timeout = Duration::from_millis(
            parse_num::<u64>("TRANSLATE_TIMEOUT_MS", get("TRANSLATE_TIMEOUT_MS"))?
                .unwrap_or(10_000)
                .max(1),
        );
        let google_endpoint = get("GOOGLE_TRANSLATE_ENDPOINT")
            .unwrap_or_else(|| "https://translate.googleapis.com".to_string())
            .trim_end_matches('/')
            .to_string();

        // Outbound rate limiting (every Telegram call, not just broadcasts)
        let defaults = ThrottleConfig::default();
        let throttle = ThrottleConfig {
            global_min_interval: parse_num::<u64>(
                "TELEGRAM_MIN_INTERVAL_MS",
                get("TELEGRAM_MIN_INTERVAL_MS"),
            )?
            .map(Duration::from_millis)
            .unwrap_or(defaults.global_min_interval),
            per_chat_min_interval: defaults.per_chat_min_interval,
        };

        Ok(Self {
            telegram_bot_token,
            admins,
            languages: Arc::new(languages),
            default_lang,
            fallback_lang,
            auto_detect_reverse,
            auto_detect_min_chars,
            translate_timeout,
            google_endpoint,
            throttle,
        })
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            default_lang: self.default_lang.clone(),
            fallback_lang: self.fallback_lang.clone(),
            reverse_default: self.auto_detect_reverse,
            min_detect_chars: self.auto_detect_min_chars,
            detect_timeout: self.translate_timeout,
        }
    }
}

fn registry_code(
    registry: &LanguageRegistry,
    key: &str,
    value: Option<String>,
    default: &str,
) -> Result<LanguageCode> {
    let raw = value.unwrap_or_else(|| default.to_string());
    registry.code(&raw).ok_or_else(|| {
        Error::Config(format!(
            "{key}={raw} is not in the language registry ({})",
            registry.codes_csv()
        ))
    })
}

fn parse_bool(key: &str, value: Option<String>) -> Result<Option<bool>> {
    let Some(v) = value else {
        return Ok(None);
    };
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(Error::Config(format!("{key} must be a boolean, got {v:?}"))),
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: Option<String>) -> Result<Option<T>> {
    let Some(v) = value else {
        return Ok(None);
    };
    v.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| Error::Config(format!("{key} must be a non-negative number, got {v:?}")))
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
