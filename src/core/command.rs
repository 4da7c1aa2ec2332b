use std::fmt;
use std::fmt::{Display, Formatter};
use async_trait::async_trait;
use crate::core::shelf::ShelfError;

#[derive(Debug)]
pub enum CommandError {
    Access {
        message: String,
        reason_code: Option<String>,
    },
    Store {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Network {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Serialization {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<ShelfError> for CommandError {
    fn from(other: ShelfError) -> Self {
        match other {
            ShelfError::Store { message, reason_code, retryable } => {
                CommandError::Store { message, reason_code, retryable }
            }
            ShelfError::Network { message, reason_code, retryable } => {
                CommandError::Network { message, reason_code, retryable }
            }
            ShelfError::AccessDenied { message, reason_code } => {
                CommandError::Access { message, reason_code }
            }
            ShelfError::DuplicateKey { message } => {
                CommandError::DuplicateKey { message }
            }
            ShelfError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            ShelfError::CurrentlyUnavailable { message, reason_code, retryable } => {
                CommandError::Runtime { message, reason_code, retryable }
            }
            ShelfError::Validation { message, reason_code } => {
                CommandError::Validation { message, reason_code }
            }
            ShelfError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            ShelfError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code, retryable: true }
            }
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Access { message, .. } => write!(f, "{}", message),
            CommandError::Store { message, .. } => write!(f, "{}", message),
            CommandError::Network { message, .. } => write!(f, "{}", message),
            CommandError::DuplicateKey { message } => write!(f, "{}", message),
            CommandError::NotFound { message } => write!(f, "{}", message),
            CommandError::Runtime { message, .. } => write!(f, "{}", message),
            CommandError::Serialization { message } => write!(f, "{}", message),
            CommandError::Validation { message, .. } => write!(f, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::CommandError;
    use crate::core::shelf::ShelfError;

    #[tokio::test]
    async fn test_should_build_command_error() {
        let _ = CommandError::Access { message: "test".to_string(), reason_code: None };
        let _ = CommandError::Store { message: "test".to_string(), reason_code: None, retryable: false };
        let _ = CommandError::Network { message: "test".to_string(), reason_code: None, retryable: true };
        let _ = CommandError::Runtime { message: "test".to_string(), reason_code: None, retryable: false };
        let _ = CommandError::Serialization { message: "test".to_string() };
        let _ = CommandError::Validation { message: "test".to_string(), reason_code: None };
    }

    #[tokio::test]
    async fn test_should_convert_shelf_error() {
        assert!(matches!(CommandError::from(ShelfError::not_found("test")),
                         CommandError::NotFound { message: _ }));
        assert!(matches!(CommandError::from(ShelfError::network("test", None, true)),
                         CommandError::Network { message: _, reason_code: _, retryable: true }));
        assert!(matches!(CommandError::from(ShelfError::duplicate_key("test")),
                         CommandError::DuplicateKey { message: _ }));
    }

    #[tokio::test]
    async fn test_should_format_free_text_message() {
        let err = CommandError::NotFound { message: "no saved book matches key OL1W".to_string() };
        assert_eq!("no saved book matches key OL1W", err.to_string());
    }
}
