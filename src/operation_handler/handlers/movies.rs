//! Movie operation handlers

use super::{
    list_response, no_content_response, not_modified_response, payload, required_id,
    resource_response, settle,
};
use crate::{
    error::{CatalogError, CatalogResult},
    operation_handler::core::{
        CatalogOperationHandler, LOCATION, OperationRequest, OperationResponse, StatusCode,
    },
    resource::{MOVIE, MoviePatch, NewMovie, RequestContext},
    storage::StorageProvider,
};
use log::debug;

/// Handle movie creation. Answers 201 with `Location`.
pub async fn handle_create<S: StorageProvider>(
    handler: &CatalogOperationHandler<S>,
    mut request: OperationRequest,
    context: &RequestContext,
) -> CatalogResult<OperationResponse> {
    let representation = handler.representation(&request)?;
    let input: NewMovie = payload(&mut request)?;

    let movie = handler.provider.create_movie(input, context).await?;
    let id = movie.resource().id.clone();

    Ok(resource_response(
        StatusCode::Created,
        representation.movie(&movie, &handler.config),
        movie.fingerprint(),
        representation,
        MOVIE,
        &id,
        context,
    )
    .with_header(LOCATION, handler.config.movie_location(&id)))
}

/// Handle movie reads, honouring `If-None-Match` / `If-Modified-Since`.
pub async fn handle_get<S: StorageProvider>(
    handler: &CatalogOperationHandler<S>,
    mut request: OperationRequest,
    context: &RequestContext,
) -> CatalogResult<OperationResponse> {
    let representation = handler.representation(&request)?;
    let id = required_id(&mut request)?;

    let movie = handler
        .provider
        .get_movie(&id, context)
        .await?
        .ok_or_else(|| CatalogError::resource_not_found(MOVIE, &id))?;

    if request
        .headers
        .conditional_read()
        .is_not_modified(movie.fingerprint())
    {
        debug!("Movie '{}' not modified (request: '{}')", id, context.request_id);
        return Ok(not_modified_response(movie.fingerprint(), MOVIE, &id, context));
    }

    Ok(resource_response(
        StatusCode::Ok,
        representation.movie(&movie, &handler.config),
        movie.fingerprint(),
        representation,
        MOVIE,
        &id,
        context,
    ))
}

pub async fn handle_list<S: StorageProvider>(
    handler: &CatalogOperationHandler<S>,
    request: OperationRequest,
    context: &RequestContext,
) -> CatalogResult<OperationResponse> {
    let representation = handler.representation(&request)?;
    let query = request.query.unwrap_or_default();
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(handler.config.list_page_size);

    let page = handler.provider.list_movies(offset, limit, context).await?;
    let items: Vec<_> = page
        .items
        .iter()
        .map(|movie| representation.movie(movie, &handler.config))
        .collect();
    let count = items.len();

    Ok(list_response(
        representation.list(items, page.total, page.offset),
        count,
        page.total,
        representation,
        MOVIE,
        context,
    ))
}

/// Handle conditional movie updates.
pub async fn handle_update<S: StorageProvider>(
    handler: &CatalogOperationHandler<S>,
    mut request: OperationRequest,
    context: &RequestContext,
) -> CatalogResult<OperationResponse> {
    let representation = handler.representation(&request)?;
    let id = required_id(&mut request)?;
    let patch: MoviePatch = payload(&mut request)?;

    let result = handler
        .provider
        .update_movie(&id, patch, &request.headers.conditional(), context)
        .await?;
    let movie = match settle(result, MOVIE, &id, context)? {
        Ok(movie) => movie,
        Err(conflict) => return Ok(conflict),
    };

    Ok(resource_response(
        StatusCode::Ok,
        representation.movie(&movie, &handler.config),
        movie.fingerprint(),
        representation,
        MOVIE,
        &id,
        context,
    ))
}

/// Handle conditional movie deletion. Answers 204.
pub async fn handle_delete<S: StorageProvider>(
    handler: &CatalogOperationHandler<S>,
    mut request: OperationRequest,
    context: &RequestContext,
) -> CatalogResult<OperationResponse> {
    let id = required_id(&mut request)?;

    let result = handler
        .provider
        .delete_movie(&id, &request.headers.conditional(), context)
        .await?;
    if let Err(conflict) = settle(result, MOVIE, &id, context)? {
        return Ok(conflict);
    }

    Ok(no_content_response(MOVIE, &id, context))
}
