use thiserror::Error;

use crate::constants::*;
use crate::models::ApiError;

/// Why fetching a page failed. Every variant is terminal for that request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No response was received (DNS, connection, timeout).
    #[error("{0}")]
    Transport(String),

    /// HTTP 401. Never empty: an undecodable body yields one synthetic error.
    #[error("{}", unauthorized_summary(.0))]
    Unauthorized(Vec<ApiError>),

    /// A response arrived but its body did not match the expected schema.
    #[error("JSON Decoding Failed!")]
    Decoding { reason: String },
}

impl FetchError {
    /// Message shown under a list whose "load more" request failed.
    pub fn load_more_message(&self) -> String {
        match self {
            FetchError::Unauthorized(errors) => errors
                .first()
                .map(|e| e.detail.clone())
                .unwrap_or_else(|| ERR_AUTHORISATION.to_string()),
            other => other.to_string(),
        }
    }
}

fn unauthorized_summary(errors: &[ApiError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {} ({})", e.title, e.detail, e.status))
        .collect::<Vec<_>>()
        .join("; ")
}

/// The single generic error substituted when a 401 body cannot be decoded.
pub fn synthetic_authorisation_error() -> ApiError {
    ApiError {
        status: "401".to_string(),
        title: ERR_AUTHORISATION.to_string(),
        detail: ERR_AUTHORISATION.to_string(),
        source_pointer: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOperation {
    Add,
    Remove,
}

/// Why adding or removing a tag failed. Nothing local was changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Too many tags added to this transaction. Each transaction may have up to 6 tags.")]
    TagLimitExceeded,

    /// Any other non-204 status, or `None` when no response arrived.
    #[error("{}", mutation_failure_message(.operation))]
    Failed {
        operation: TagOperation,
        status: Option<u16>,
    },
}

fn mutation_failure_message(operation: &TagOperation) -> &'static str {
    match operation {
        TagOperation::Add => ERR_TAG_NOT_ADDED,
        TagOperation::Remove => ERR_TAG_NOT_REMOVED,
    }
}

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("Failed to write preferences: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}
