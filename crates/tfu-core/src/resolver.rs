//! Target-language resolution.
//!
//! Precedence for a translate request: explicit code > stored preference > default. When
//! the result is the default language and that language is configured as the reverse
//! language, text that is already written in it is sent to the fallback language instead.

use std::{sync::Arc, time::Duration};

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{
    domain::UserId,
    errors::Error,
    intent::Intent,
    languages::{primary_subtag, LanguageCode, LanguageRegistry},
    ports::LanguageDetector,
    session::{SessionStore, UserSession},
    Result,
};

#[derive(Clone, Debug)]
pub struct ResolverConfig {
    pub default_lang: LanguageCode,
    pub fallback_lang: LanguageCode,
    /// Whether `default_lang` acts as the reverse language (auto-detect override).
    pub reverse_default: bool,
    /// Bodies shorter than this (in chars) never reach the detector.
    pub min_detect_chars: usize,
    pub detect_timeout: Duration,
}

/// What to translate and into which language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub target: LanguageCode,
    pub text: String,
    /// Set when auto-detection redirected the default target to the fallback.
    pub reversed: bool,
}

pub struct LanguageResolver {
    registry: Arc<LanguageRegistry>,
    sessions: Arc<dyn SessionStore>,
    detector: Arc<dyn LanguageDetector>,
    cfg: ResolverConfig,
}

impl LanguageResolver {
    pub fn new(
        registry: Arc<LanguageRegistry>,
        sessions: Arc<dyn SessionStore>,
        detector: Arc<dyn LanguageDetector>,
        cfg: ResolverConfig,
    ) -> Self {
        Self {
            registry,
            sessions,
            detector,
            cfg,
        }
    }

    pub fn default_lang(&self) -> &LanguageCode {
        &self.cfg.default_lang
    }

    /// Resolve a translate intent (`PlainText` or `ExplicitTranslate`) against `session`.
    pub async fn resolve(&self, intent: &Intent, session: &UserSession) -> Result<Resolution> {
        match intent {
            Intent::ExplicitTranslate { lang, body } => {
                let target = self
                    .registry
                    .code(lang)
                    .ok_or_else(|| Error::UnknownLanguageCode(lang.clone()))?;
                Ok(Resolution {
                    target,
                    text: body.clone(),
                    reversed: false,
                })
            }
            Intent::PlainText { body } => {
                let target = session
                    .target_lang
                    .clone()
                    .unwrap_or_else(|| self.cfg.default_lang.clone());
                let reversed =
                    self.should_detect(&target, body) && self.in_default_lang(body).await;
                let target = if reversed {
                    self.cfg.fallback_lang.clone()
                } else {
                    target
                };
                Ok(Resolution {
                    target,
                    text: body.clone(),
                    reversed,
                })
            }
            other => Err(Error::Internal(format!(
                "{} intent has no text to translate",
                other.kind()
            ))),
        }
    }

    /// Store `code` as the user's target language.
    ///
    /// Unknown codes leave the session untouched.
    pub async fn set_language(&self, user: UserId, code: &str) -> Result<LanguageCode> {
        let lang = self
            .registry
            .code(code)
            .ok_or_else(|| Error::UnknownLanguageCode(code.to_string()))?;
        self.sessions
            .set_target_lang(user, Some(lang.clone()))
            .await;
        Ok(lang)
    }

    /// Clear the stored preference; idempotent.
    pub async fn reset(&self, user: UserId) {
        self.sessions.set_target_lang(user, None).await;
    }

    fn should_detect(&self, target: &LanguageCode, body: &str) -> bool {
        self.cfg.reverse_default
            && *target == self.cfg.default_lang
            && body.trim().chars().count() >= self.cfg.min_detect_chars
    }

    /// Whether the detector reports `body` as the default language. Failures count as no.
    async fn in_default_lang(&self, body: &str) -> bool {
        match self.detect(body).await {
            Ok(source)
                if primary_subtag(&source)
                    .eq_ignore_ascii_case(self.cfg.default_lang.primary_subtag()) =>
            {
                debug!(
                    detected = %source,
                    fallback = %self.cfg.fallback_lang,
                    "text already in default language; reversing target"
                );
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(error = %e, "auto-detect failed; keeping resolved target");
                false
            }
        }
    }

    async fn detect(&self, body: &str) -> Result<String> {
        match timeout(self.cfg.detect_timeout, self.detector.detect(body)).await {
            Err(_) => Err(Error::DetectionFailed(format!(
                "no answer within {}ms",
                self.cfg.detect_timeout.as_millis()
            ))),
            Ok(Err(e)) => Err(Error::DetectionFailed(e.to_string())),
            Ok(Ok(code)) => Ok(code),
        }
    }
}
