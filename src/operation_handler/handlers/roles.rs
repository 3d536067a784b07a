//! Role operation handlers
//!
//! Roles are embedded in their movie, so every role operation is a conditional
//! write on the movie. Responses carry the movie's representation and the movie's
//! post-write `ETag`/`Last-Modified`, which is what the next conditional request
//! has to present.

use super::{payload, required_id, required_role_id, resource_response, settle};
use crate::{
    error::CatalogResult,
    operation_handler::core::{
        CatalogOperationHandler, LOCATION, OperationRequest, OperationResponse, StatusCode,
    },
    resource::{MOVIE, NewRole, RequestContext, RolePatch},
    storage::StorageProvider,
};
use serde_json::Value;

/// Append a role. Answers 200 with the movie and the new role's `Location`.
pub async fn handle_add<S: StorageProvider>(
    handler: &CatalogOperationHandler<S>,
    mut request: OperationRequest,
    context: &RequestContext,
) -> CatalogResult<OperationResponse> {
    let representation = handler.representation(&request)?;
    let movie_id = required_id(&mut request)?;
    let input: NewRole = payload(&mut request)?;

    let result = handler
        .provider
        .add_role(&movie_id, input, &request.headers.conditional(), context)
        .await?;
    let change = match settle(result, MOVIE, &movie_id, context)? {
        Ok(change) => change,
        Err(conflict) => return Ok(conflict),
    };

    let mut response = resource_response(
        StatusCode::Ok,
        representation.movie(&change.movie, &handler.config),
        change.movie.fingerprint(),
        representation,
        MOVIE,
        &movie_id,
        context,
    )
    .with_header(
        LOCATION,
        handler.config.role_location(&movie_id, &change.role.id),
    );
    response
        .metadata
        .additional
        .insert("role_id".to_string(), Value::String(change.role.id));
    Ok(response)
}

pub async fn handle_update<S: StorageProvider>(
    handler: &CatalogOperationHandler<S>,
    mut request: OperationRequest,
    context: &RequestContext,
) -> CatalogResult<OperationResponse> {
    let representation = handler.representation(&request)?;
    let movie_id = required_id(&mut request)?;
    let role_id = required_role_id(&mut request)?;
    let patch: RolePatch = payload(&mut request)?;

    let result = handler
        .provider
        .update_role(
            &movie_id,
            &role_id,
            patch,
            &request.headers.conditional(),
            context,
        )
        .await?;
    let change = match settle(result, MOVIE, &movie_id, context)? {
        Ok(change) => change,
        Err(conflict) => return Ok(conflict),
    };

    let mut response = resource_response(
        StatusCode::Ok,
        representation.movie(&change.movie, &handler.config),
        change.movie.fingerprint(),
        representation,
        MOVIE,
        &movie_id,
        context,
    );
    response
        .metadata
        .additional
        .insert("role_id".to_string(), Value::String(role_id));
    Ok(response)
}

pub async fn handle_remove<S: StorageProvider>(
    handler: &CatalogOperationHandler<S>,
    mut request: OperationRequest,
    context: &RequestContext,
) -> CatalogResult<OperationResponse> {
    let representation = handler.representation(&request)?;
    let movie_id = required_id(&mut request)?;
    let role_id = required_role_id(&mut request)?;

    let result = handler
        .provider
        .remove_role(&movie_id, &role_id, &request.headers.conditional(), context)
        .await?;
    let movie = match settle(result, MOVIE, &movie_id, context)? {
        Ok(movie) => movie,
        Err(conflict) => return Ok(conflict),
    };

    Ok(resource_response(
        StatusCode::Ok,
        representation.movie(&movie, &handler.config),
        movie.fingerprint(),
        representation,
        MOVIE,
        &movie_id,
        context,
    ))
}
