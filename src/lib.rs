//! Movie catalogue library with HTTP-style optimistic concurrency control.
//!
//! Movies, actors and the roles linking them, kept in a pluggable document store.
//! Writes are guarded by `If-Unmodified-Since` / `If-Match` preconditions against a
//! resource fingerprint (an opaque content token plus a last-modified stamp), so a
//! client working from a stale copy gets a conflict instead of silently overwriting
//! someone else's change.
//!
//! # Core Components
//!
//! - [`ConcurrencyGuard`] - pure precondition evaluation against a fingerprint
//! - [`StorageProvider`](storage::StorageProvider) - document storage with stamp compare-and-swap
//! - [`CatalogProvider`] - Movie/Actor/MovieRole operations, cascade and stamping
//! - [`CatalogOperationHandler`] - transport-agnostic status/header mapping
//!
//! # Quick Start
//!
//! ```rust
//! use movie_catalog::{CatalogOperationHandler, CatalogProvider, OperationRequest, StatusCode};
//! use movie_catalog::storage::InMemoryStorage;
//! use serde_json::json;
//!
//! # async fn example() {
//! let handler = CatalogOperationHandler::new(CatalogProvider::new(InMemoryStorage::new()));
//!
//! let created = handler
//!     .handle(OperationRequest::create_movie(json!({"title": "rocky27"})))
//!     .await;
//! let movie_id = created.metadata.resource_id.clone().unwrap();
//! let stale = created.header("Last-Modified").unwrap().to_string();
//!
//! let first = handler
//!     .handle(
//!         OperationRequest::add_role(&movie_id, json!({"character": "challenger"}))
//!             .with_if_unmodified_since(stale.clone()),
//!     )
//!     .await;
//! assert_eq!(first.status, StatusCode::Ok);
//!
//! // Same precondition again: the movie changed in between.
//! let second = handler
//!     .handle(
//!         OperationRequest::add_role(&movie_id, json!({"character": "challenger"}))
//!             .with_if_unmodified_since(stale),
//!     )
//!     .await;
//! assert_eq!(second.status, StatusCode::Conflict);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod operation_handler;
pub mod providers;
pub mod representation;
pub mod resource;
pub mod storage;

pub use config::CatalogConfig;
pub use error::{CatalogError, CatalogResult, ValidationError};
pub use operation_handler::{
    CatalogOperationHandler, OperationMetadata, OperationRequest, OperationResponse,
    OperationType, StatusCode,
};
pub use providers::{CatalogProvider, ProviderError};
pub use representation::Representation;
pub use resource::{
    ConcurrencyGuard, ConditionalRequest, ConditionalResult, Decision, MalformedCondition,
    RequestContext, ResourceFingerprint, fingerprint_of,
};
