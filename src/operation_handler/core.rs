//! Core operation handler infrastructure
//!
//! Request/response types and the dispatcher. The handler is transport-agnostic: it
//! takes the header values it cares about as plain strings and answers with a
//! status, headers and an optional JSON body, leaving the wire to the caller.

use crate::{
    config::CatalogConfig,
    error::CatalogResult,
    providers::CatalogProvider,
    representation::Representation,
    resource::{ACTOR, ConditionalRead, ConditionalRequest, MOVIE, MOVIE_ROLE, RequestContext},
    storage::StorageProvider,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

pub const ETAG: &str = "ETag";
pub const LAST_MODIFIED: &str = "Last-Modified";
pub const LOCATION: &str = "Location";
pub const CONTENT_TYPE: &str = "Content-Type";

/// Transport-agnostic handler for catalogue operations.
pub struct CatalogOperationHandler<S: StorageProvider> {
    pub(super) provider: CatalogProvider<S>,
    pub(super) config: CatalogConfig,
}

/// Structured request for a catalogue operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    /// The operation to perform
    pub operation: OperationType,
    /// Movie or actor ID for operations that target one
    pub resource_id: Option<String>,
    /// Role ID for role operations that target one role
    pub role_id: Option<String>,
    /// JSON payload for create/update operations
    pub data: Option<Value>,
    /// Pagination for list operations
    pub query: Option<PageQuery>,
    /// Header values relevant to the operation
    pub headers: RequestHeaders,
    /// Request ID for tracing and correlation
    pub request_id: Option<String>,
}

/// Catalogue operations supported by the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    CreateMovie,
    GetMovie,
    ListMovies,
    UpdateMovie,
    DeleteMovie,
    AddRole,
    UpdateRole,
    RemoveRole,
    CreateActor,
    GetActor,
    ListActors,
    UpdateActor,
    DeleteActor,
}

impl OperationType {
    /// Resource type the operation acts on.
    pub fn resource_type(&self) -> &'static str {
        match self {
            OperationType::CreateMovie
            | OperationType::GetMovie
            | OperationType::ListMovies
            | OperationType::UpdateMovie
            | OperationType::DeleteMovie => MOVIE,
            OperationType::AddRole | OperationType::UpdateRole | OperationType::RemoveRole => {
                MOVIE_ROLE
            }
            OperationType::CreateActor
            | OperationType::GetActor
            | OperationType::ListActors
            | OperationType::UpdateActor
            | OperationType::DeleteActor => ACTOR,
        }
    }

    /// Whether the operation changes state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            OperationType::GetMovie
                | OperationType::ListMovies
                | OperationType::GetActor
                | OperationType::ListActors
        )
    }
}

/// Offset/limit pagination for list operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Zero-based index of the first item
    pub offset: Option<usize>,
    /// Maximum number of items; the configured page size when absent
    pub limit: Option<usize>,
}

/// Request headers the handler understands, as raw values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    pub accept: Option<String>,
    pub if_unmodified_since: Option<String>,
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
}

impl RequestHeaders {
    /// Write preconditions.
    pub fn conditional(&self) -> ConditionalRequest {
        ConditionalRequest {
            if_unmodified_since: self.if_unmodified_since.clone(),
            if_match: self.if_match.clone(),
        }
    }

    /// Read validators.
    pub fn conditional_read(&self) -> ConditionalRead {
        ConditionalRead {
            if_none_match: self.if_none_match.clone(),
            if_modified_since: self.if_modified_since.clone(),
        }
    }
}

/// HTTP status of an operation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    Ok,
    Created,
    NoContent,
    NotModified,
    BadRequest,
    NotFound,
    NotAcceptable,
    Conflict,
    UnprocessableEntity,
    InternalServerError,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::NoContent => 204,
            StatusCode::NotModified => 304,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::NotAcceptable => 406,
            StatusCode::Conflict => 409,
            StatusCode::UnprocessableEntity => 422,
            StatusCode::InternalServerError => 500,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.as_u16())
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::NotAcceptable => "Not Acceptable",
            StatusCode::Conflict => "Conflict",
            StatusCode::UnprocessableEntity => "Unprocessable Entity",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Structured response from a catalogue operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResponse {
    pub status: StatusCode,
    /// Whether the operation succeeded (2xx or 304)
    pub success: bool,
    /// Response body, in the negotiated representation
    pub data: Option<Value>,
    /// Error message if the operation failed
    pub error: Option<String>,
    /// Error code for programmatic handling
    pub error_code: Option<String>,
    /// Response headers in insertion order
    pub headers: Vec<(String, String)>,
    pub metadata: OperationMetadata,
}

impl OperationResponse {
    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

/// Metadata about an operation, including version information.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationMetadata {
    /// Resource type involved in the operation
    pub resource_type: Option<String>,
    /// Resource ID if applicable
    pub resource_id: Option<String>,
    /// Number of resources returned (for list operations)
    pub resource_count: Option<usize>,
    /// Total number of resources available (for pagination)
    pub total_results: Option<usize>,
    /// Request ID for tracing
    pub request_id: String,
    /// Additional metadata including version information
    pub additional: HashMap<String, Value>,
}

impl<S: StorageProvider> CatalogOperationHandler<S> {
    pub fn new(provider: CatalogProvider<S>) -> Self {
        Self::with_config(provider, CatalogConfig::default())
    }

    pub fn with_config(provider: CatalogProvider<S>, config: CatalogConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &CatalogProvider<S> {
        &self.provider
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Handle a structured request.
    ///
    /// Never fails: every error is turned into a response with the matching status.
    pub async fn handle(&self, request: OperationRequest) -> OperationResponse {
        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        if request.operation.is_mutation() {
            info!(
                "Operation handler processing {:?} (request: '{}')",
                request.operation, request_id
            );
        } else {
            debug!(
                "Operation handler processing {:?} (request: '{}')",
                request.operation, request_id
            );
        }

        let context = RequestContext::new(request_id.clone());

        let result = match request.operation {
            OperationType::CreateMovie => {
                super::handlers::movies::handle_create(self, request, &context).await
            }
            OperationType::GetMovie => {
                super::handlers::movies::handle_get(self, request, &context).await
            }
            OperationType::ListMovies => {
                super::handlers::movies::handle_list(self, request, &context).await
            }
            OperationType::UpdateMovie => {
                super::handlers::movies::handle_update(self, request, &context).await
            }
            OperationType::DeleteMovie => {
                super::handlers::movies::handle_delete(self, request, &context).await
            }
            OperationType::AddRole => {
                super::handlers::roles::handle_add(self, request, &context).await
            }
            OperationType::UpdateRole => {
                super::handlers::roles::handle_update(self, request, &context).await
            }
            OperationType::RemoveRole => {
                super::handlers::roles::handle_remove(self, request, &context).await
            }
            OperationType::CreateActor => {
                super::handlers::actors::handle_create(self, request, &context).await
            }
            OperationType::GetActor => {
                super::handlers::actors::handle_get(self, request, &context).await
            }
            OperationType::ListActors => {
                super::handlers::actors::handle_list(self, request, &context).await
            }
            OperationType::UpdateActor => {
                super::handlers::actors::handle_update(self, request, &context).await
            }
            OperationType::DeleteActor => {
                super::handlers::actors::handle_delete(self, request, &context).await
            }
        };

        match &result {
            Ok(response) => {
                debug!(
                    "Operation handler completed with {} (request: '{}')",
                    response.status, request_id
                );
            }
            Err(e) => {
                warn!("Operation handler failed: {} (request: '{}')", e, request_id);
            }
        }

        result.unwrap_or_else(|e| super::errors::create_error_response(e, request_id))
    }

    /// Representation negotiated from the request's `Accept` header.
    pub(super) fn representation(&self, request: &OperationRequest) -> CatalogResult<Representation> {
        Representation::negotiate(
            request.headers.accept.as_deref(),
            self.config.default_representation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_are_not_mutations() {
        assert!(!OperationType::GetMovie.is_mutation());
        assert!(!OperationType::ListActors.is_mutation());
        assert!(OperationType::AddRole.is_mutation());
        assert!(OperationType::DeleteActor.is_mutation());
    }
}
