//! Error and conflict response construction shared by all handlers.

use crate::{
    error::CatalogError,
    operation_handler::core::{ETAG, LAST_MODIFIED, OperationMetadata, OperationResponse},
    resource::{ConflictReason, PreconditionConflict},
};
use serde_json::Value;
use std::collections::HashMap;

/// Create an error response from a CatalogError.
pub fn create_error_response(error: CatalogError, request_id: String) -> OperationResponse {
    OperationResponse {
        status: error.status_code(),
        success: false,
        data: None,
        error: Some(error.to_string()),
        error_code: Some(error.error_code().to_string()),
        headers: Vec::new(),
        metadata: OperationMetadata {
            request_id,
            ..OperationMetadata::default()
        },
    }
}

/// Create a 409 response for a failed precondition.
///
/// Carries the current, unmodified fingerprint both as `ETag`/`Last-Modified`
/// headers and in the metadata, so the client can refresh and retry.
pub fn create_conflict_response(
    conflict: PreconditionConflict,
    request_id: String,
    resource_type: Option<String>,
    resource_id: Option<String>,
) -> OperationResponse {
    let current = &conflict.current;

    let mut additional = HashMap::new();
    additional.insert(
        "current_version".to_string(),
        Value::String(current.token().as_str().to_string()),
    );
    additional.insert(
        "current_etag".to_string(),
        Value::String(current.etag_header()),
    );
    additional.insert(
        "current_last_modified".to_string(),
        Value::String(current.last_modified_header()),
    );
    additional.insert(
        "conflict_reason".to_string(),
        Value::String(
            match conflict.reason {
                ConflictReason::ModifiedSince { .. } => "modified_since",
                ConflictReason::EntityTagMismatch => "entity_tag_mismatch",
                ConflictReason::ConcurrentWrite => "concurrent_write",
            }
            .to_string(),
        ),
    );

    OperationResponse {
        status: crate::operation_handler::StatusCode::Conflict,
        success: false,
        data: None,
        error: Some(conflict.message()),
        error_code: Some("PRECONDITION_FAILED".to_string()),
        headers: vec![
            (ETAG.to_string(), current.etag_header()),
            (LAST_MODIFIED.to_string(), current.last_modified_header()),
        ],
        metadata: OperationMetadata {
            resource_type,
            resource_id,
            request_id,
            additional,
            ..OperationMetadata::default()
        },
    }
}
