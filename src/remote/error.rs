//! Mapping store failures onto [`JournalError`].

use std::fmt;

use reqwest::StatusCode;

use crate::error::JournalError;

/// A non-success response from the store.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// What was being requested, used for not-found reporting.
    pub subject: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            subject: subject.into(),
        }
    }

    pub fn to_journal_error(&self) -> JournalError {
        match self.status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => JournalError::Auth(format!(
                "store rejected the API key ({}): {}",
                self.status, self.message
            )),
            StatusCode::NOT_FOUND => JournalError::NotFound(self.subject.clone()),
            status => JournalError::Api(format!("{status}: {}", self.message)),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl From<ApiError> for JournalError {
    fn from(err: ApiError) -> Self {
        err.to_journal_error()
    }
}

/// A cached, replayable initialization failure.
///
/// The identity barrier keeps the first outcome for the life of the process;
/// every later caller gets an equivalent [`JournalError`] rebuilt from this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitFailure {
    Auth(String),
    Transport(String),
    Other(String),
}

impl From<&JournalError> for InitFailure {
    fn from(err: &JournalError) -> Self {
        match err {
            JournalError::Auth(msg) => InitFailure::Auth(msg.clone()),
            JournalError::Transport(msg) => InitFailure::Transport(msg.clone()),
            other => InitFailure::Other(other.to_string()),
        }
    }
}

impl From<InitFailure> for JournalError {
    fn from(failure: InitFailure) -> Self {
        match failure {
            InitFailure::Auth(msg) => JournalError::Auth(msg),
            InitFailure::Transport(msg) => JournalError::Transport(msg),
            InitFailure::Other(msg) => JournalError::Other(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let auth = ApiError::new(StatusCode::UNAUTHORIZED, "bad key", "verify").to_journal_error();
        assert!(auth.is_auth());

        let forbidden = ApiError::new(StatusCode::FORBIDDEN, "nope", "n1").to_journal_error();
        assert!(forbidden.is_auth());

        let missing = ApiError::new(StatusCode::NOT_FOUND, "gone", "n1").to_journal_error();
        assert!(matches!(missing, JournalError::NotFound(ref id) if id == "n1"));

        let other = ApiError::new(StatusCode::BAD_GATEWAY, "upstream", "n1").to_journal_error();
        assert!(matches!(other, JournalError::Api(ref m) if m.contains("502")));
    }

    #[test]
    fn test_init_failure_replays_variant() {
        let original = JournalError::Auth("API key invalid".to_string());
        let failure = InitFailure::from(&original);
        let replayed: JournalError = failure.clone().into();
        assert!(replayed.is_auth());
        assert_eq!(replayed.to_string(), original.to_string());

        let io = JournalError::Io(std::io::Error::other("disk"));
        let replayed: JournalError = InitFailure::from(&io).into();
        assert!(matches!(replayed, JournalError::Other(ref m) if m.contains("disk")));
    }
}
