//! Google Translate adapter.
//!
//! Talks to the public `translate_a/single` endpoint (the one the web widget uses), which
//! needs no API key and reports the detected source language with every answer.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use tfu_core::{
    errors::Error,
    ports::{LanguageDetector, Translator},
    Result,
};

/// The endpoint rejects longer queries.
pub const MAX_QUERY_CHARS: usize = 5000;

#[derive(Clone, Debug)]
pub struct GoogleTranslateClient {
    endpoint: String,
    http: reqwest::Client,
}

/// Parsed `translate_a/single` answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoogleTranslation {
    pub text: String,
    pub detected_source: Option<String>,
}

impl GoogleTranslateClient {
    /// `endpoint` is the scheme + host, e.g. `https://translate.googleapis.com`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("google http client build failed: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub async fn translate_raw(
        &self,
        source: &str,
        target: &str,
        text: &str,
    ) -> Result<GoogleTranslation> {
        let chars = text.chars().count();
        if chars > MAX_QUERY_CHARS {
            return Err(Error::External(format!(
                "google translate: text is {chars} characters, limit is {MAX_QUERY_CHARS}"
            )));
        }

        let resp = self
            .http
            .get(format!("{}/translate_a/single", self.endpoint))
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| Error::External(format!("google request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "google translate failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::External(format!("google json error: {e}")))?;

        let parsed = parse_response(&v)?;
        debug!(
            source,
            target,
            detected = parsed.detected_source.as_deref().unwrap_or("-"),
            "google translate ok"
        );
        Ok(parsed)
    }
}

/// Pull the translation and detected language out of the nested-array answer:
/// `[[["Hola","Hello",..],..], null, "en", ..]`.
pub fn parse_response(v: &serde_json::Value) -> Result<GoogleTranslation> {
    let segments = v
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| Error::External("google translate: unexpected response shape".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|t| t.as_str()))
        .collect();

    let detected_source = v
        .get(2)
        .and_then(|d| d.as_str())
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(GoogleTranslation {
        text,
        detected_source,
    })
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn translate(&self, source: &str, target: &str, text: &str) -> Result<String> {
        Ok(self.translate_raw(source, target, text).await?.text)
    }
}

#[async_trait]
impl LanguageDetector for GoogleTranslateClient {
    async fn detect(&self, text: &str) -> Result<String> {
        self.translate_raw("auto", "en", text)
            .await?
            .detected_source
            .ok_or_else(|| Error::External("google translate: no detected language".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn client(server: &MockServer) -> GoogleTranslateClient {
        GoogleTranslateClient::new(server.uri(), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn joins_sentence_segments() {
        let v = json!([
            [["Hola. ", "Hello. ", null, null, 10], ["¿Cómo estás?", "How are you?", null, null, 10]],
            null,
            "en"
        ]);
        let parsed = parse_response(&v).unwrap();
        assert_eq!(parsed.text, "Hola. ¿Cómo estás?");
        assert_eq!(parsed.detected_source.as_deref(), Some("en"));
    }

    #[test]
    fn rejects_unexpected_shapes() {
        assert!(parse_response(&json!({"error": "nope"})).is_err());
        assert!(parse_response(&json!([null, null, "en"])).is_err());
    }

    #[tokio::test]
    async fn translate_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("client", "gtx"))
            .and(query_param("sl", "auto"))
            .and(query_param("tl", "es"))
            .and(query_param("q", "Hello"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([[["Hola", "Hello"]], null, "en"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let out = client(&server).translate("auto", "es", "Hello").await.unwrap();
        assert_eq!(out, "Hola");
    }

    #[tokio::test]
    async fn detect_returns_source_language() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("tl", "en"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([[["Hello", "မင်္ဂလာပါ"]], null, "my"])),
            )
            .mount(&server)
            .await;

        let code = client(&server).detect("မင်္ဂလာပါ").await.unwrap();
        assert_eq!(code, "my");
    }

    #[tokio::test]
    async fn http_errors_are_external() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .mount(&server)
            .await;

        let err = client(&server).translate("auto", "fr", "hi").await.unwrap_err();
        match err {
            Error::External(msg) => assert!(msg.contains("429")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_text_never_hits_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let text = "a".repeat(MAX_QUERY_CHARS + 1);
        assert!(client(&server).translate("auto", "de", &text).await.is_err());
    }
}
