use std::sync::Arc;

use tfu_core::{
    config::Config,
    ports::{LanguageDetector, Translator},
};
use tfu_google::GoogleTranslateClient;

#[tokio::main]
async fn main() -> Result<(), tfu_core::Error> {
    tfu_core::logging::init("tfu")?;

    let cfg = Arc::new(Config::load()?);

    let google = Arc::new(GoogleTranslateClient::new(
        cfg.google_endpoint.clone(),
        cfg.translate_timeout,
    )?);
    let translator: Arc<dyn Translator> = google.clone();
    let detector: Arc<dyn LanguageDetector> = google;

    tfu_telegram::router::run_polling(cfg, translator, detector)
        .await
        .map_err(|e| tfu_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
