/// Core error type.
///
/// The first group of variants is user-correctable and maps to a specific reply; the
/// rest are infrastructure failures that surface as a generic notice. Adapter crates
/// map their own errors into this type so the router can reply consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed command, usage: {usage_hint}")]
    MalformedCommand { usage_hint: String },

    #[error("unknown language code: {0}")]
    UnknownLanguageCode(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("translation unavailable: {0}")]
    TranslationUnavailable(String),

    /// Never shown to users; the resolver logs it and keeps its pre-detection target.
    #[error("language detection failed: {0}")]
    DetectionFailed(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn malformed(usage_hint: impl Into<String>) -> Self {
        Self::MalformedCommand {
            usage_hint: usage_hint.into(),
        }
    }

    /// Whether the user can fix this by changing their input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Error::MalformedCommand { .. } | Error::UnknownLanguageCode(_) | Error::Unauthorized
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
