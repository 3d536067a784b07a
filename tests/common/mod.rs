//! Shared helpers for the integration tests.

#![allow(dead_code)]

use movie_catalog::operation_handler::{
    CatalogOperationHandler, OperationRequest, OperationResponse, StatusCode,
};
use movie_catalog::providers::CatalogProvider;
use movie_catalog::resource::{NewActor, NewMovie, RequestContext, VersionedResource};
use movie_catalog::resource::{Actor, Movie};
use movie_catalog::storage::InMemoryStorage;
use serde_json::{Value, json};

/// Route library logs to the test harness when `RUST_LOG` is set.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn provider() -> CatalogProvider<InMemoryStorage> {
    init_logging();
    CatalogProvider::new(InMemoryStorage::new())
}

pub fn handler() -> CatalogOperationHandler<InMemoryStorage> {
    CatalogOperationHandler::new(provider())
}

pub fn context() -> RequestContext {
    RequestContext::with_generated_id()
}

pub async fn seed_movie(
    provider: &CatalogProvider<InMemoryStorage>,
    title: &str,
) -> VersionedResource<Movie> {
    provider
        .create_movie(
            NewMovie {
                title: title.to_string(),
            },
            &context(),
        )
        .await
        .expect("Failed to create movie")
}

pub async fn seed_actor(
    provider: &CatalogProvider<InMemoryStorage>,
    name: &str,
) -> VersionedResource<Actor> {
    provider
        .create_actor(NewActor::named(name), &context())
        .await
        .expect("Failed to create actor")
}

/// Create a movie through the handler, returning its id and `Last-Modified`.
pub async fn create_movie(
    handler: &CatalogOperationHandler<InMemoryStorage>,
    title: &str,
) -> (String, String) {
    let response = handler
        .handle(OperationRequest::create_movie(json!({ "title": title })))
        .await;
    assert_eq!(response.status, StatusCode::Created, "{:?}", response.error);

    let id = response
        .metadata
        .resource_id
        .clone()
        .expect("Created movie should carry its id");
    let last_modified = header(&response, "Last-Modified");
    (id, last_modified)
}

pub fn header(response: &OperationResponse, name: &str) -> String {
    response
        .header(name)
        .unwrap_or_else(|| panic!("Response should carry a {} header", name))
        .to_string()
}

/// Characters of the roles in a JSON movie body.
pub fn characters(movie: &Value) -> Vec<String> {
    movie["roles"]
        .as_array()
        .expect("Movie body should have a roles array")
        .iter()
        .map(|role| role["character"].as_str().unwrap_or_default().to_string())
        .collect()
}
