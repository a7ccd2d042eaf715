use thiserror::Error;

use crate::models::ApprovalStatus;

/// Client result type
pub type Result<T> = std::result::Result<T, ClientError>;

/// Form field an inline validation message belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    Password,
    UserType,
    FullName,
    Email,
    Qualification,
    Experience,
    Chapter,
    Rating,
    /// Shown above the form rather than next to an input
    General,
}

/// Every failure the client can surface. None of them are fatal to the page:
/// each one ends up as a visible message while prior state stays untouched.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ClientError {
    /// Rejected locally before any request was made
    #[error("{message}")]
    Validation { field: Field, message: String },

    #[error("Please log in to continue")]
    LoginRequired,

    #[error("Access denied. {0}")]
    AccessDenied(String),

    /// The backend answered with `success: false`
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Tutor application cannot go from {from} to {to}")]
    InvalidTransition {
        from: ApprovalStatus,
        to: ApprovalStatus,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn validation(field: Field, message: impl Into<String>) -> Self {
        ClientError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Field to attach the message to, `General` for anything not tied to an input.
    pub fn field(&self) -> Field {
        match self {
            ClientError::Validation { field, .. } => *field,
            _ => Field::General,
        }
    }

    /// Message suitable for a notification or an inline form error.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => {
                "Could not connect to the server. Please check that the backend is running."
                    .to_string()
            }
            ClientError::Parse(_) => "The server sent a response that could not be read.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_is_server_text() {
        let err = ClientError::Rejected {
            status: 401,
            message: "Invalid password".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid password");
        assert_eq!(err.field(), Field::General);
    }

    #[test]
    fn test_network_message_is_generic() {
        let err = ClientError::Network("connection refused".to_string());
        assert!(err.user_message().starts_with("Could not connect to the server"));
        assert!(err.is_network());
    }

    #[test]
    fn test_validation_keeps_field() {
        let err = ClientError::validation(Field::Password, "Please enter a password");
        assert_eq!(err.field(), Field::Password);
        assert_eq!(err.user_message(), "Please enter a password");
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = ClientError::InvalidTransition {
            from: ApprovalStatus::Approved,
            to: ApprovalStatus::Rejected,
        };
        assert_eq!(
            err.to_string(),
            "Tutor application cannot go from approved to rejected"
        );
    }
}
