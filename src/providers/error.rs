//! Error types for the catalogue provider.
//!
//! Precondition conflicts are not listed here: a failed precondition is an ordinary
//! outcome of a conditional operation and travels as
//! [`ConditionalResult::PreconditionFailed`](crate::resource::ConditionalResult).

use crate::error::ValidationError;
use crate::operation_handler::StatusCode;
use crate::resource::MalformedCondition;
use thiserror::Error;

/// Errors that can occur during catalogue provider operations.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Resource not found: {resource_type} with id '{id}'")]
    NotFound {
        /// The type of resource that was not found
        resource_type: String,
        /// The ID of the resource that was not found
        id: String,
    },

    #[error("Unknown {resource_type} '{id}' referenced by '{attribute}'")]
    UnknownReference {
        /// The type of the referenced resource
        resource_type: String,
        /// The attribute holding the reference
        attribute: String,
        /// The referenced ID that does not exist
        id: String,
    },

    #[error("{resource_type} '{id}' is still referenced by {referenced_by}")]
    ReferencedResource {
        resource_type: String,
        id: String,
        /// Human-readable description of the referrer(s)
        referenced_by: String,
    },

    #[error("Duplicate resource: {resource_type} with id '{id}' already exists")]
    DuplicateResource { resource_type: String, id: String },

    #[error("Invalid stored data: {message}")]
    InvalidData { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    MalformedCondition(#[from] MalformedCondition),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn unknown_reference(
        resource_type: impl Into<String>,
        attribute: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self::UnknownReference {
            resource_type: resource_type.into(),
            attribute: attribute.into(),
            id: id.into(),
        }
    }

    pub fn storage(error: impl std::fmt::Display) -> Self {
        Self::Storage {
            message: error.to_string(),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProviderError::NotFound { .. } => StatusCode::NotFound,
            ProviderError::UnknownReference { .. }
            | ProviderError::ReferencedResource { .. }
            | ProviderError::DuplicateResource { .. }
            | ProviderError::Validation(_) => StatusCode::UnprocessableEntity,
            ProviderError::MalformedCondition(_) => StatusCode::BadRequest,
            ProviderError::InvalidData { .. }
            | ProviderError::Storage { .. }
            | ProviderError::Internal { .. } => StatusCode::InternalServerError,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ProviderError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            ProviderError::UnknownReference { .. } => "UNKNOWN_REFERENCE",
            ProviderError::ReferencedResource { .. } => "RESOURCE_REFERENCED",
            ProviderError::DuplicateResource { .. } => "DUPLICATE_RESOURCE",
            ProviderError::InvalidData { .. } => "INVALID_STORED_DATA",
            ProviderError::Storage { .. } => "STORAGE_ERROR",
            ProviderError::Internal { .. } => "INTERNAL_ERROR",
            ProviderError::Validation(_) => "VALIDATION_ERROR",
            ProviderError::MalformedCondition(_) => "MALFORMED_CONDITION",
        }
    }
}
