//! Error types for catalogue operations.
//!
//! Each layer has its own error enum; [`CatalogError`] is the crate-level type the
//! operation handler works with, and it knows which HTTP status each failure maps to.
//! Precondition conflicts are *not* errors: they are a normal outcome
//! ([`ConditionalResult::PreconditionFailed`](crate::resource::conditional::ConditionalResult)).

use crate::operation_handler::StatusCode;
use crate::providers::ProviderError;

/// Main error type for catalogue operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Errors from the catalogue provider
    #[error("Resource provider error: {0}")]
    Provider(#[from] ProviderError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No supported representation satisfies the `Accept` header
    #[error("No acceptable representation for '{accept}'")]
    NotAcceptable { accept: String },

    /// Resource not found errors
    #[error("Resource not found: {resource_type} with ID {id}")]
    ResourceNotFound { resource_type: String, id: String },

    /// Invalid request format or parameters
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

/// Validation errors for resource data and metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Attribute present but blank
    #[error("Attribute '{attribute}' cannot be blank")]
    BlankAttribute { attribute: String },

    /// Missing meta resource type
    #[error("Missing 'meta.resourceType'")]
    MissingResourceType,

    /// Invalid meta resource type
    #[error("Invalid 'meta.resourceType': {resource_type}")]
    InvalidResourceType { resource_type: String },

    /// General validation error with custom message
    #[error("Validation failed: {message}")]
    Custom { message: String },
}

impl ValidationError {
    pub fn blank(attribute: impl Into<String>) -> Self {
        Self::BlankAttribute {
            attribute: attribute.into(),
        }
    }
}

/// Result type for catalogue operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

impl CatalogError {
    pub fn resource_not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn not_acceptable(accept: impl Into<String>) -> Self {
        Self::NotAcceptable {
            accept: accept.into(),
        }
    }

    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::Provider(provider_error) => provider_error.status_code(),
            CatalogError::Json(_) => StatusCode::UnprocessableEntity,
            CatalogError::NotAcceptable { .. } => StatusCode::NotAcceptable,
            CatalogError::ResourceNotFound { .. } => StatusCode::NotFound,
            CatalogError::InvalidRequest { .. } => StatusCode::BadRequest,
        }
    }

    /// Stable code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::Provider(provider_error) => provider_error.error_code(),
            CatalogError::Json(_) => "INVALID_JSON",
            CatalogError::NotAcceptable { .. } => "NOT_ACCEPTABLE",
            CatalogError::ResourceNotFound { .. } => "RESOURCE_NOT_FOUND",
            CatalogError::InvalidRequest { .. } => "INVALID_REQUEST",
        }
    }
}
