use std::{sync::Arc, time::Duration};

use tokio::time::timeout;

use crate::{
    errors::Error,
    languages::{LanguageCode, SOURCE_AUTO},
    ports::Translator,
    Result,
};

/// Calling contract around the external translator.
///
/// Every failure mode (provider error, timeout, empty output) becomes
/// [`Error::TranslationUnavailable`].
#[derive(Clone)]
pub struct TranslationGateway {
    translator: Arc<dyn Translator>,
    timeout: Duration,
}

impl TranslationGateway {
    pub fn new(translator: Arc<dyn Translator>, timeout: Duration) -> Self {
        Self {
            translator,
            timeout,
        }
    }

    pub async fn translate(&self, target: &LanguageCode, body: &str) -> Result<String> {
        let call = self
            .translator
            .translate(SOURCE_AUTO, target.as_str(), body);

        match timeout(self.timeout, call).await {
            Err(_) => Err(Error::TranslationUnavailable(format!(
                "provider did not answer within {}ms",
                self.timeout.as_millis()
            ))),
            Ok(Err(e)) => Err(Error::TranslationUnavailable(e.to_string())),
            Ok(Ok(text)) if text.trim().is_empty() => Err(Error::TranslationUnavailable(
                "provider returned an empty translation".to_string(),
            )),
            Ok(Ok(text)) => Ok(text),
        }
    }
}
