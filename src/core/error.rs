use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the backend client and local session storage.
#[derive(Debug, Error)]
pub enum Error {
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("{0}")]
    Backend(String),

    #[error("not logged in")]
    NotLoggedIn,

    #[error("unexpected response from {endpoint}: {detail}")]
    Decode {
        endpoint: &'static str,
        detail: String,
    },

    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("keyring: {0}")]
    Keyring(String),

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn http(endpoint: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Error::Http { endpoint, source }
    }
}
