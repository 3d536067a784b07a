//! Actor operation handlers

use super::{
    list_response, no_content_response, not_modified_response, payload, required_id,
    resource_response, settle,
};
use crate::{
    error::{CatalogError, CatalogResult},
    operation_handler::core::{
        CatalogOperationHandler, LOCATION, OperationRequest, OperationResponse, StatusCode,
    },
    resource::{ACTOR, ActorPatch, NewActor, RequestContext},
    storage::StorageProvider,
};
use log::debug;

pub async fn handle_create<S: StorageProvider>(
    handler: &CatalogOperationHandler<S>,
    mut request: OperationRequest,
    context: &RequestContext,
) -> CatalogResult<OperationResponse> {
    let representation = handler.representation(&request)?;
    let input: NewActor = payload(&mut request)?;

    let actor = handler.provider.create_actor(input, context).await?;
    let id = actor.resource().id.clone();

    Ok(resource_response(
        StatusCode::Created,
        representation.actor(&actor, &handler.config),
        actor.fingerprint(),
        representation,
        ACTOR,
        &id,
        context,
    )
    .with_header(LOCATION, handler.config.actor_location(&id)))
}

pub async fn handle_get<S: StorageProvider>(
    handler: &CatalogOperationHandler<S>,
    mut request: OperationRequest,
    context: &RequestContext,
) -> CatalogResult<OperationResponse> {
    let representation = handler.representation(&request)?;
    let id = required_id(&mut request)?;

    let actor = handler
        .provider
        .get_actor(&id, context)
        .await?
        .ok_or_else(|| CatalogError::resource_not_found(ACTOR, &id))?;

    if request
        .headers
        .conditional_read()
        .is_not_modified(actor.fingerprint())
    {
        debug!("Actor '{}' not modified (request: '{}')", id, context.request_id);
        return Ok(not_modified_response(actor.fingerprint(), ACTOR, &id, context));
    }

    Ok(resource_response(
        StatusCode::Ok,
        representation.actor(&actor, &handler.config),
        actor.fingerprint(),
        representation,
        ACTOR,
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

    let page = handler.provider.list_actors(offset, limit, context).await?;
    let items: Vec<_> = page
        .items
        .iter()
        .map(|actor| representation.actor(actor, &handler.config))
        .collect();
    let count = items.len();

    Ok(list_response(
        representation.list(items, page.total, page.offset),
        count,
        page.total,
        representation,
        ACTOR,
        context,
    ))
}

pub async fn handle_update<S: StorageProvider>(
    handler: &CatalogOperationHandler<S>,
    mut request: OperationRequest,
    context: &RequestContext,
) -> CatalogResult<OperationResponse> {
    let representation = handler.representation(&request)?;
    let id = required_id(&mut request)?;
    let patch: ActorPatch = payload(&mut request)?;

    let result = handler
        .provider
        .update_actor(&id, patch, &request.headers.conditional(), context)
        .await?;
    let actor = match settle(result, ACTOR, &id, context)? {
        Ok(actor) => actor,
        Err(conflict) => return Ok(conflict),
    };

    Ok(resource_response(
        StatusCode::Ok,
        representation.actor(&actor, &handler.config),
        actor.fingerprint(),
        representation,
        ACTOR,
        &id,
        context,
    ))
}

/// Answers 422 while any role still references the actor.
pub async fn handle_delete<S: StorageProvider>(
    handler: &CatalogOperationHandler<S>,
    mut request: OperationRequest,
    context: &RequestContext,
) -> CatalogResult<OperationResponse> {
    let id = required_id(&mut request)?;

    let result = handler
        .provider
        .delete_actor(&id, &request.headers.conditional(), context)
        .await?;
    if let Err(conflict) = settle(result, ACTOR, &id, context)? {
        return Ok(conflict);
    }

    Ok(no_content_response(ACTOR, &id, context))
}
