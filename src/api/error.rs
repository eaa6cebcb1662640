use thiserror::Error;

/// Why a remote fetch failed. All variants are recoverable: the
/// orchestrator answers every one of them by reading the local store.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected HTTP status {0}")]
    BadStatus(reqwest::StatusCode),

    #[error("malformed payload: {0}")]
    ParseFailure(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::ParseFailure(e.to_string())
        } else {
            FetchError::Unreachable(e.to_string())
        }
    }
}
