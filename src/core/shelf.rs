use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ShelfError {
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
    AccessDenied {
        message: String,
        reason_code: Option<String>,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    // This is a retry-able error, which indicates that the document store was
    // reachable but could not serve the request yet, e.g. throttled capacity.
    // The caller can retry with or without a backoff.
    CurrentlyUnavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl ShelfError {
    pub fn store(message: &str, reason_code: Option<String>, retryable: bool) -> ShelfError {
        ShelfError::Store { message: message.to_string(), reason_code, retryable }
    }

    pub fn network(message: &str, reason_code: Option<String>, retryable: bool) -> ShelfError {
        ShelfError::Network { message: message.to_string(), reason_code, retryable }
    }

    pub fn access_denied(message: &str, reason_code: Option<String>) -> ShelfError {
        ShelfError::AccessDenied { message: message.to_string(), reason_code }
    }

    pub fn duplicate_key(message: &str) -> ShelfError {
        ShelfError::DuplicateKey { message: message.to_string() }
    }

    pub fn not_found(message: &str) -> ShelfError {
        ShelfError::NotFound { message: message.to_string() }
    }

    pub fn unavailable(message: &str, reason_code: Option<String>, retryable: bool) -> ShelfError {
        ShelfError::CurrentlyUnavailable { message: message.to_string(), reason_code, retryable }
    }

    pub fn store_or_unavailable(message: &str, reason: Option<String>, retryable: bool) -> ShelfError {
        if retryable {
            ShelfError::unavailable(
                format!("document store unavailable error {:?} {:?}", message, reason).as_str(), reason, true)
        } else if let Some(ref reason_val) = reason {
            if reason_val.as_str().contains("404") {
                ShelfError::not_found(
                    format!("not found error {:?} {:?}", message, reason).as_str())
            } else if reason_val.as_str().contains("400") {
                ShelfError::access_denied(
                    format!("access-denied error {:?} {:?}", message, reason).as_str(), reason)
            } else {
                ShelfError::store(
                    format!("document store error {:?} {:?}", message, reason).as_str(), reason, false)
            }
        } else {
            ShelfError::store(
                format!("document store error {:?} {:?}", message, reason).as_str(), reason, false)
        }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> ShelfError {
        ShelfError::Validation { message: message.to_string(), reason_code }
    }

    pub fn serialization(message: &str) -> ShelfError {
        ShelfError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> ShelfError {
        ShelfError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn retryable(&self) -> bool {
        match self {
            ShelfError::Store { retryable, .. } => { *retryable }
            ShelfError::Network { retryable, .. } => { *retryable }
            ShelfError::AccessDenied { .. } => { false }
            ShelfError::DuplicateKey { .. } => { false }
            ShelfError::NotFound { .. } => { false }
            ShelfError::CurrentlyUnavailable { retryable, .. } => { *retryable }
            ShelfError::Validation { .. } => { false }
            ShelfError::Serialization { .. } => { false }
            ShelfError::Runtime { .. } => { false }
        }
    }
}

impl From<std::io::Error> for ShelfError {
    fn from(err: std::io::Error) -> Self {
        ShelfError::runtime(
            format!("serde io {:?}", err).as_str(), None)
    }
}

impl From<serde_json::Error> for ShelfError {
    fn from(err: serde_json::Error) -> Self {
        ShelfError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<reqwest::Error> for ShelfError {
    fn from(err: reqwest::Error) -> Self {
        let reason = err.status().map(|status| status.as_u16().to_string());
        let retryable = err.is_timeout() || err.is_connect()
            || err.status().map(|status| status.is_server_error()).unwrap_or(false);
        ShelfError::network(format!("search request failed {:?}", err).as_str(), reason, retryable)
    }
}

impl From<String> for ShelfError {
    fn from(err: String) -> Self {
        ShelfError::serialization(
            format!("serde parsing {:?}", err).as_str())
    }
}

impl Display for ShelfError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ShelfError::Store { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            ShelfError::Network { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            ShelfError::AccessDenied { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            ShelfError::DuplicateKey { message } => {
                write!(f, "{}", message)
            }
            ShelfError::NotFound { message } => {
                write!(f, "{}", message)
            }
            ShelfError::CurrentlyUnavailable { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            ShelfError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            ShelfError::Serialization { message } => {
                write!(f, "{}", message)
            }
            ShelfError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

/// A specialized Result type for the data-access layer.
pub type ShelfResult<T> = Result<T, ShelfError>;

// It defines abstraction for paginated result
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    // The page token this page was requested with
    pub page: Option<String>,
    // page size
    pub page_size: usize,
    // Opaque token for the next page if available
    pub next_page: Option<String>,
    // A full page is taken to mean more records exist; an exact-multiple
    // collection costs one extra empty fetch. Never derived from a count query.
    pub has_more: bool,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub(crate) fn new(page: Option<&str>, page_size: usize,
                      next_page: Option<String>, records: Vec<T>) -> Self {
        PaginatedResult {
            page: page.map(str::to_string),
            page_size,
            next_page,
            has_more: records.len() == page_size,
            records,
        }
    }
}

// The uniform result envelope handed to presentation-layer consumers.
// Loading models an in-flight request for callers that poll before completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DataState<T> {
    Loading,
    Success { data: T },
    Error { message: String },
}

impl<T> DataState<T> {
    pub fn success(data: T) -> Self {
        DataState::Success { data }
    }

    pub fn error(message: &str) -> Self {
        DataState::Error { message: message.to_string() }
    }

    pub fn from_result<E: Display>(res: Result<T, E>) -> Self {
        match res {
            Ok(data) => DataState::Success { data },
            Err(err) => DataState::Error { message: err.to_string() },
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum CoverSize {
    Small,
    Medium,
    Large,
}

impl From<String> for CoverSize {
    fn from(s: String) -> Self {
        match s.as_str() {
            "S" => CoverSize::Small,
            "M" => CoverSize::Medium,
            "L" => CoverSize::Large,
            _ => CoverSize::Medium,
        }
    }
}

impl Display for CoverSize {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CoverSize::Small => write!(f, "S"),
            CoverSize::Medium => write!(f, "M"),
            CoverSize::Large => write!(f, "L"),
        }
    }
}
