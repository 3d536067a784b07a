//! Operation handlers, one module per resource, plus the response plumbing they share.

pub mod actors;
pub mod movies;
pub mod roles;

use crate::{
    error::{CatalogError, CatalogResult},
    operation_handler::{
        core::{
            CONTENT_TYPE, ETAG, LAST_MODIFIED, OperationMetadata, OperationRequest,
            OperationResponse, StatusCode,
        },
        create_conflict_response,
    },
    representation::Representation,
    resource::{ConditionalResult, RequestContext, ResourceFingerprint},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Decode the request payload.
///
/// A missing payload is a bad request; one that doesn't fit the expected shape is
/// unprocessable.
pub(super) fn payload<T: DeserializeOwned>(request: &mut OperationRequest) -> CatalogResult<T> {
    let data = request.data.take().ok_or_else(|| {
        CatalogError::invalid_request(format!(
            "Missing data for {:?} operation",
            request.operation
        ))
    })?;
    Ok(serde_json::from_value(data)?)
}

pub(super) fn required_id(request: &mut OperationRequest) -> CatalogResult<String> {
    request.resource_id.take().ok_or_else(|| {
        CatalogError::invalid_request(format!(
            "Missing resource_id for {:?} operation",
            request.operation
        ))
    })
}

pub(super) fn required_role_id(request: &mut OperationRequest) -> CatalogResult<String> {
    request.role_id.take().ok_or_else(|| {
        CatalogError::invalid_request(format!(
            "Missing role_id for {:?} operation",
            request.operation
        ))
    })
}

/// Unwrap a conditional outcome, or produce the response that ends the request.
///
/// `NotFound` becomes a 404 error; a failed precondition becomes a 409 response.
pub(super) fn settle<T>(
    result: ConditionalResult<T>,
    resource_type: &str,
    resource_id: &str,
    context: &RequestContext,
) -> CatalogResult<Result<T, OperationResponse>> {
    match result {
        ConditionalResult::Success(value) => Ok(Ok(value)),
        ConditionalResult::PreconditionFailed(conflict) => Ok(Err(create_conflict_response(
            conflict,
            context.request_id.clone(),
            Some(resource_type.to_string()),
            Some(resource_id.to_string()),
        ))),
        ConditionalResult::NotFound => Err(CatalogError::resource_not_found(
            resource_type,
            resource_id,
        )),
    }
}

/// A single-resource response carrying its fingerprint headers.
pub(super) fn resource_response(
    status: StatusCode,
    body: Value,
    fingerprint: &ResourceFingerprint,
    representation: Representation,
    resource_type: &str,
    resource_id: &str,
    context: &RequestContext,
) -> OperationResponse {
    OperationResponse {
        status,
        success: true,
        data: Some(body),
        error: None,
        error_code: None,
        headers: vec![
            (CONTENT_TYPE.to_string(), representation.content_type().to_string()),
            (ETAG.to_string(), fingerprint.etag_header()),
            (LAST_MODIFIED.to_string(), fingerprint.last_modified_header()),
        ],
        metadata: OperationMetadata {
            resource_type: Some(resource_type.to_string()),
            resource_id: Some(resource_id.to_string()),
            resource_count: Some(1),
            request_id: context.request_id.clone(),
            additional: version_metadata(fingerprint),
            ..OperationMetadata::default()
        },
    }
}

/// 304: validators only, no body.
pub(super) fn not_modified_response(
    fingerprint: &ResourceFingerprint,
    resource_type: &str,
    resource_id: &str,
    context: &RequestContext,
) -> OperationResponse {
    OperationResponse {
        status: StatusCode::NotModified,
        success: true,
        data: None,
        error: None,
        error_code: None,
        headers: vec![
            (ETAG.to_string(), fingerprint.etag_header()),
            (LAST_MODIFIED.to_string(), fingerprint.last_modified_header()),
        ],
        metadata: OperationMetadata {
            resource_type: Some(resource_type.to_string()),
            resource_id: Some(resource_id.to_string()),
            request_id: context.request_id.clone(),
            additional: version_metadata(fingerprint),
            ..OperationMetadata::default()
        },
    }
}

pub(super) fn list_response(
    body: Value,
    count: usize,
    total: usize,
    representation: Representation,
    resource_type: &str,
    context: &RequestContext,
) -> OperationResponse {
    OperationResponse {
        status: StatusCode::Ok,
        success: true,
        data: Some(body),
        error: None,
        error_code: None,
        headers: vec![(
            CONTENT_TYPE.to_string(),
            representation.content_type().to_string(),
        )],
        metadata: OperationMetadata {
            resource_type: Some(resource_type.to_string()),
            resource_count: Some(count),
            total_results: Some(total),
            request_id: context.request_id.clone(),
            ..OperationMetadata::default()
        },
    }
}

pub(super) fn no_content_response(
    resource_type: &str,
    resource_id: &str,
    context: &RequestContext,
) -> OperationResponse {
    OperationResponse {
        status: StatusCode::NoContent,
        success: true,
        data: None,
        error: None,
        error_code: None,
        headers: Vec::new(),
        metadata: OperationMetadata {
            resource_type: Some(resource_type.to_string()),
            resource_id: Some(resource_id.to_string()),
            request_id: context.request_id.clone(),
            ..OperationMetadata::default()
        },
    }
}

fn version_metadata(fingerprint: &ResourceFingerprint) -> HashMap<String, Value> {
    let mut additional = HashMap::new();
    additional.insert(
        "version".to_string(),
        Value::String(fingerprint.token().as_str().to_string()),
    );
    additional.insert("etag".to_string(), Value::String(fingerprint.etag_header()));
    additional.insert(
        "last_modified".to_string(),
        Value::String(fingerprint.last_modified_header()),
    );
    additional
}
