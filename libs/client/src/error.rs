//! Client error types

use thiserror::Error;

/// Errors returned by the client data layer
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a usable response
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// A success envelope arrived without the expected payload
    #[error("{0}")]
    MissingData(&'static str),

    /// The configured base URL cannot be used
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// HTTP status reported by the API, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Text to show a user: the server's message when there is one,
    /// otherwise the error text, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_text() {
        let err = ClientError::Api {
            status: 400,
            message: "Email already exists".to_string(),
        };
        assert_eq!(err.user_message("Failed to create user"), "Email already exists");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn user_message_falls_back_when_blank() {
        let err = ClientError::Api {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.user_message("Failed to delete user"), "Failed to delete user");
    }
}
