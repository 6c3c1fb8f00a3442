use async_trait::async_trait;

use crate::Result;

/// External machine-translation capability.
///
/// `source` is a language code or [`crate::languages::SOURCE_AUTO`].
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, source: &str, target: &str, text: &str) -> Result<String>;
}

/// External language-identification capability. Returns a language code such as `"my"`.
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, text: &str) -> Result<String>;
}
