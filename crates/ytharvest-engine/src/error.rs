use thiserror::Error;

use ytharvest_core::Field;

/// Failure reported by a [`Page`](crate::page::Page) backend.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("operation not supported by this page backend: {0}")]
    Unsupported(&'static str),

    #[error("element is no longer attached to the document")]
    Detached,

    #[error("page backend error: {0}")]
    Backend(String),
}

impl From<chromiumoxide::error::CdpError> for PageError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        PageError::Backend(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Page(#[from] PageError),

    #[error("locator '{field}' has an invalid pattern \"{pattern}\": {source}")]
    InvalidPattern {
        field: Field,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Why a single thread could not be replied to.
#[derive(Debug, Error)]
pub enum ReplyFailure {
    #[error("reply control not found")]
    ReplyControlMissing,

    #[error("reply input not found after opening the editor")]
    InputMissing,

    #[error("submit control not found, reply was not submitted")]
    SubmitMissing,

    #[error("{stage} failed: {source}")]
    Page {
        stage: &'static str,
        #[source]
        source: PageError,
    },
}
