use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("authentication error: {0}")]
    Auth(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("entry '{0}' not found")]
    NotFound(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no usable cached value")]
    CacheMiss,

    #[error("API error: {0}")]
    Api(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, JournalError>;

impl JournalError {
    pub fn is_auth(&self) -> bool {
        matches!(self, JournalError::Auth(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, JournalError::NotFound(_))
    }
}

impl From<reqwest::Error> for JournalError {
    fn from(err: reqwest::Error) -> Self {
        // Body decode failures mean the store answered with the wrong shape.
        if err.is_decode() {
            JournalError::MalformedResponse(err.to_string())
        } else {
            JournalError::Transport(err.to_string())
        }
    }
}
