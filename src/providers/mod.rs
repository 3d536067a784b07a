//! Catalogue provider on top of a pluggable storage backend.
//!
//! * [`CatalogProvider`] - Movie/Actor/MovieRole operations with conditional writes
//! * [`ProviderError`] - provider failures and their HTTP status
//! * [`helpers::MetadataManager`] - stamp clock

pub mod catalog;
pub mod error;
pub mod helpers;

pub use catalog::{CatalogProvider, Page, RoleChange};
pub use error::{ProviderError, ProviderResult};
