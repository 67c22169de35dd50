//! Error types for file system operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::Action;
use crate::node::{ItemId, ItemKind};

/// Result type for remote service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Acknowledgement returned by a successful mutating call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack;

/// Failures reported by the remote file system service.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceError {
    /// The service did not answer.
    #[error("No response from service")]
    NoResponse,

    /// The answer could not be interpreted.
    #[error("Invalid response from service")]
    InvalidResponse,

    /// The session is not authenticated.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The session may not act on an item.
    #[error("Permission denied: {item}")]
    PermissionDenied { item: ItemId },

    /// An item does not exist (anymore).
    #[error("Item not found: {item}")]
    NotFound { item: ItemId },

    /// The request was malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The service refused the request.
    #[error("Request failed: {message}")]
    RequestFailed { message: String },
}

impl ServiceError {
    /// Create a not-found error.
    pub fn not_found(item: impl Into<ItemId>) -> Self {
        Self::NotFound { item: item.into() }
    }

    /// Create a permission denied error.
    pub fn permission_denied(item: impl Into<ItemId>) -> Self {
        Self::PermissionDenied { item: item.into() }
    }

    /// Create a request failure.
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::RequestFailed {
            message: message.into(),
        }
    }
}

/// Local validation failures. These are never sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The action is not defined for the item variant (or for batches when `kind` is None).
    #[error("Unsupported action: {action}")]
    UnsupportedAction {
        action: Action,
        kind: Option<ItemKind>,
    },

    /// The resolved target folder fails the legality check.
    #[error("Cannot {action} to '{target}'")]
    IllegalTarget { action: Action, target: ItemId },

    /// A proposed name was empty or unchanged.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A selection must hold at least one item.
    #[error("Selection cannot be empty")]
    EmptySelection,
}

impl ValidationError {
    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
