//! Transport-agnostic catalogue operation handler.
//!
//! Turns guard decisions and provider outcomes into HTTP-level answers: status
//! codes, `ETag`/`Last-Modified`/`Location`/`Content-Type` headers and a JSON body
//! in the negotiated representation.
//!
//! # Key Types
//!
//! - [`CatalogOperationHandler`] - dispatches [`OperationRequest`]s
//! - [`OperationRequest`] - operation, ids, payload and raw header values
//! - [`OperationResponse`] - status, headers, body and metadata
//!
//! # Examples
//!
//! ```rust
//! use movie_catalog::operation_handler::{CatalogOperationHandler, OperationRequest, StatusCode};
//! use movie_catalog::providers::CatalogProvider;
//! use movie_catalog::storage::InMemoryStorage;
//! use serde_json::json;
//!
//! # async fn example() {
//! let handler = CatalogOperationHandler::new(CatalogProvider::new(InMemoryStorage::new()));
//!
//! let created = handler
//!     .handle(OperationRequest::create_movie(json!({"title": "rocky27"})))
//!     .await;
//! assert_eq!(created.status, StatusCode::Created);
//!
//! let movie_id = created.metadata.resource_id.clone().unwrap();
//! let last_modified = created.header("Last-Modified").unwrap();
//!
//! let added = handler
//!     .handle(
//!         OperationRequest::add_role(&movie_id, json!({"character": "challenger"}))
//!             .with_if_unmodified_since(last_modified),
//!     )
//!     .await;
//! assert_eq!(added.status, StatusCode::Ok);
//! # }
//! ```

mod builders;
mod core;
mod errors;
mod handlers;

pub use core::{
    CONTENT_TYPE, CatalogOperationHandler, ETAG, LAST_MODIFIED, LOCATION, OperationMetadata,
    OperationRequest, OperationResponse, OperationType, PageQuery, RequestHeaders, StatusCode,
};

pub use errors::{create_conflict_response, create_error_response};
