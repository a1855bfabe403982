//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image provider error: {0}")]
    AiProvider(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl Error {
    /// Description suitable for showing to the end user.
    ///
    /// Provider errors carry the remote service's own wording, so they are
    /// returned bare. `None` means the failure had no usable description.
    pub fn user_message(&self) -> Option<String> {
        let message = match self {
            Error::AiProvider(msg) => msg.trim().to_string(),
            other => other.to_string(),
        };
        if message.is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_is_returned_verbatim() {
        let err = Error::AiProvider("quota exceeded".to_string());
        assert_eq!(err.user_message().as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn test_blank_provider_message_has_no_description() {
        assert!(Error::AiProvider("   ".to_string()).user_message().is_none());
        assert!(Error::AiProvider(String::new()).user_message().is_none());
    }

    #[test]
    fn test_other_variants_use_display() {
        let err = Error::Decode("bad base64".to_string());
        assert_eq!(
            err.user_message().as_deref(),
            Some("Decode error: bad base64")
        );
    }
}
