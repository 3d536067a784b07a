//! Helper traits for catalogue providers.
//!
//! * [`MetadataManager`] - stamp clock and `meta` construction

pub mod metadata;

pub use metadata::MetadataManager;
