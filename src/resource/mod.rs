//! Catalogue resource model and the optimistic concurrency core.
//!
//! # Key Components
//!
//! * [`ConcurrencyGuard`] - pure decision function for conditional writes
//! * [`ResourceFingerprint`] / [`fingerprint_of`] - opaque token plus stamp of a resource
//! * [`ConditionalRequest`] / [`Decision`] - write preconditions in, proceed/conflict out
//! * [`Movie`], [`MovieRole`], [`Actor`] - the catalogue entities
//! * [`VersionedResource`] - an entity paired with its fingerprint
//! * [`RequestContext`] - request tracking for log correlation

pub mod actor;
pub mod conditional;
pub mod context;
pub mod fingerprint;
pub mod meta;
pub mod movie;
pub mod version;
pub mod versioned;

pub use actor::{ACTOR, Actor, ActorPatch, NewActor};
pub use conditional::{
    ConcurrencyGuard, ConditionalRead, ConditionalRequest, ConditionalResult, ConflictReason,
    Decision, MalformedCondition, PreconditionConflict, Preconditions,
};
pub use context::RequestContext;
pub use fingerprint::{
    Fingerprinted, ResourceFingerprint, fingerprint_of, format_http_date, parse_http_date,
};
pub use meta::Meta;
pub use movie::{MOVIE, MOVIE_ROLE, Movie, MoviePatch, MovieRole, NewMovie, NewRole, RolePatch};
pub use version::{EntityTagList, HttpVersion, RawVersion, ResourceVersion, VersionError};
pub use versioned::VersionedResource;

use crate::error::{ValidationError, ValidationResult};

/// Trimmed, non-blank text for a required attribute.
pub(crate) fn require_text(attribute: &str, value: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::blank(attribute));
    }
    Ok(trimmed.to_string())
}
