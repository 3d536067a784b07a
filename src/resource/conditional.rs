//! Optimistic concurrency control for conditional writes.
//!
//! [`ConcurrencyGuard::evaluate`] is a pure predicate: it takes the preconditions a
//! client sent with a write and the fingerprint of the resource as it is stored now,
//! and decides whether the write may proceed. It owns no state, performs no I/O and
//! never retries. Performing the write after a [`Decision::Proceed`], and reporting
//! the post-write fingerprint, is the caller's job.
//!
//! Supported preconditions:
//!
//! * `If-Unmodified-Since` - satisfied when the supplied date is at least as recent as
//!   the resource's `last_modified` (equality satisfies)
//! * `If-Match` - satisfied by `*` or by any listed tag whose opaque value equals the
//!   current token
//!
//! With no precondition at all the write proceeds unconditionally.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use movie_catalog::resource::conditional::{ConcurrencyGuard, ConditionalRequest, Decision};
//! use movie_catalog::resource::fingerprint::ResourceFingerprint;
//! use movie_catalog::resource::version::RawVersion;
//!
//! let stamp = Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, 9).unwrap();
//! let current = ResourceFingerprint::new(RawVersion::from_hash("f0"), stamp);
//!
//! let fresh = ConditionalRequest::unmodified_since("Wed, 06 Jan 2016 06:13:09 GMT");
//! assert!(matches!(ConcurrencyGuard::evaluate(&fresh, &current), Ok(Decision::Proceed(_))));
//!
//! let stale = ConditionalRequest::unmodified_since("Wed, 06 Jan 2016 06:13:08 GMT");
//! assert!(matches!(ConcurrencyGuard::evaluate(&stale, &current), Ok(Decision::Conflict(_))));
//!
//! let garbage = ConditionalRequest::unmodified_since("not-a-date");
//! assert!(ConcurrencyGuard::evaluate(&garbage, &current).is_err());
//! ```

use crate::resource::fingerprint::{Fingerprinted, ResourceFingerprint, fingerprint_of, parse_http_date};
use crate::resource::version::EntityTagList;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

pub const IF_UNMODIFIED_SINCE: &str = "If-Unmodified-Since";
pub const IF_MATCH: &str = "If-Match";

/// Write preconditions as received, one raw header value each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalRequest {
    pub if_unmodified_since: Option<String>,
    pub if_match: Option<String>,
}

impl ConditionalRequest {
    /// No preconditions: the write proceeds unconditionally.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn unmodified_since(header: impl Into<String>) -> Self {
        Self {
            if_unmodified_since: Some(header.into()),
            if_match: None,
        }
    }

    pub fn if_match(header: impl Into<String>) -> Self {
        Self {
            if_unmodified_since: None,
            if_match: Some(header.into()),
        }
    }

    /// Preconditions a client holding `fingerprint` would send: its `Last-Modified`
    /// echoed as `If-Unmodified-Since`.
    pub fn from_fingerprint(fingerprint: &ResourceFingerprint) -> Self {
        Self::unmodified_since(fingerprint.last_modified_header())
    }

    pub fn with_if_match(mut self, header: impl Into<String>) -> Self {
        self.if_match = Some(header.into());
        self
    }

    pub fn with_if_unmodified_since(mut self, header: impl Into<String>) -> Self {
        self.if_unmodified_since = Some(header.into());
        self
    }

    pub fn is_conditional(&self) -> bool {
        self.if_unmodified_since.is_some() || self.if_match.is_some()
    }

    /// Parse the raw header values.
    pub fn parse(&self) -> Result<Preconditions, MalformedCondition> {
        let unmodified_since = self
            .if_unmodified_since
            .as_deref()
            .map(|value| {
                parse_http_date(value).ok_or_else(|| MalformedCondition::InvalidDate {
                    header: IF_UNMODIFIED_SINCE,
                    value: value.to_string(),
                })
            })
            .transpose()?;

        let if_match = self
            .if_match
            .as_deref()
            .map(|value| {
                value
                    .parse::<EntityTagList>()
                    .map_err(|_| MalformedCondition::InvalidEntityTag {
                        header: IF_MATCH,
                        value: value.to_string(),
                    })
            })
            .transpose()?;

        Ok(Preconditions {
            unmodified_since,
            if_match,
        })
    }
}

/// Parsed, typed write preconditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preconditions {
    pub unmodified_since: Option<DateTime<Utc>>,
    pub if_match: Option<EntityTagList>,
}

impl Preconditions {
    pub fn unmodified_since(since: DateTime<Utc>) -> Self {
        Self {
            unmodified_since: Some(since),
            if_match: None,
        }
    }

    /// Check these preconditions against the current fingerprint, at full precision.
    pub fn check(&self, current: &ResourceFingerprint) -> Decision {
        if let Some(since) = self.unmodified_since {
            if since < current.last_modified() {
                return Decision::Conflict(PreconditionConflict::new(
                    current.clone(),
                    ConflictReason::ModifiedSince { since },
                ));
            }
        }

        if let Some(tags) = &self.if_match {
            if !tags.matches(current.token()) {
                return Decision::Conflict(PreconditionConflict::new(
                    current.clone(),
                    ConflictReason::EntityTagMismatch,
                ));
            }
        }

        Decision::Proceed(current.clone())
    }
}

/// Outcome of evaluating a conditional write.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The write may proceed. Carries the fingerprint the check passed against;
    /// the caller recomputes the fingerprint after writing.
    Proceed(ResourceFingerprint),
    /// The resource changed since the client last saw it.
    Conflict(PreconditionConflict),
}

impl Decision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Decision::Proceed(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Decision::Conflict(_))
    }
}

/// Why a precondition was not met.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// `If-Unmodified-Since` was earlier than the stored `last_modified`.
    ModifiedSince { since: DateTime<Utc> },
    /// No `If-Match` tag matched the current token.
    EntityTagMismatch,
    /// The guard passed but another write landed before this one could.
    ConcurrentWrite,
}

/// A failed precondition, with the fingerprint the client should retry against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreconditionConflict {
    pub current: ResourceFingerprint,
    pub reason: ConflictReason,
}

impl PreconditionConflict {
    pub fn new(current: ResourceFingerprint, reason: ConflictReason) -> Self {
        Self { current, reason }
    }

    pub fn message(&self) -> String {
        match &self.reason {
            ConflictReason::ModifiedSince { since } => format!(
                "Resource was modified at {} after {}. Please refresh and try again.",
                self.current.last_modified_header(),
                crate::resource::fingerprint::format_http_date(since)
            ),
            ConflictReason::EntityTagMismatch => format!(
                "Resource version is now {}. Please refresh and try again.",
                self.current.etag()
            ),
            ConflictReason::ConcurrentWrite => {
                "Resource was modified by another request. Please refresh and try again."
                    .to_string()
            }
        }
    }
}

impl fmt::Display for PreconditionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Precondition failed: {}", self.message())
    }
}

impl std::error::Error for PreconditionConflict {}

/// A precondition header that could not be parsed. Maps to 400.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedCondition {
    #[error("Malformed {header} header: '{value}' is not an HTTP date")]
    InvalidDate { header: &'static str, value: String },

    #[error("Malformed {header} header: '{value}' is not an entity-tag list")]
    InvalidEntityTag { header: &'static str, value: String },
}

/// Stateless decision function for conditional writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcurrencyGuard;

impl ConcurrencyGuard {
    /// Fingerprint of a resource's current state.
    pub fn fingerprint_of<R: Fingerprinted + ?Sized>(resource: &R) -> ResourceFingerprint {
        fingerprint_of(resource)
    }

    /// Decide whether a write may proceed against `current`.
    ///
    /// Both headers are parsed before anything is compared, so a malformed header is
    /// reported even when the other one would already have failed.
    pub fn evaluate(
        request: &ConditionalRequest,
        current: &ResourceFingerprint,
    ) -> Result<Decision, MalformedCondition> {
        if !request.is_conditional() {
            return Ok(Decision::Proceed(current.clone()));
        }

        Ok(request.parse()?.check(current))
    }
}

/// Result of a conditional operation on a stored resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalResult<T> {
    Success(T),
    PreconditionFailed(PreconditionConflict),
    NotFound,
}

impl<T> ConditionalResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ConditionalResult::Success(_))
    }

    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, ConditionalResult::PreconditionFailed(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ConditionalResult::NotFound)
    }

    pub fn into_success(self) -> Option<T> {
        match self {
            ConditionalResult::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_conflict(self) -> Option<PreconditionConflict> {
        match self {
            ConditionalResult::PreconditionFailed(conflict) => Some(conflict),
            _ => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> ConditionalResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            ConditionalResult::Success(value) => ConditionalResult::Success(f(value)),
            ConditionalResult::PreconditionFailed(conflict) => {
                ConditionalResult::PreconditionFailed(conflict)
            }
            ConditionalResult::NotFound => ConditionalResult::NotFound,
        }
    }
}

/// Read-side validators (`If-None-Match`, `If-Modified-Since`).
///
/// Invalid values are ignored rather than rejected, as HTTP requires for these
/// headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalRead {
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
}

impl ConditionalRead {
    /// Whether the client's cached copy is still current (answer 304).
    ///
    /// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted when
    /// it is absent.
    pub fn is_not_modified(&self, current: &ResourceFingerprint) -> bool {
        if let Some(header) = &self.if_none_match {
            return header
                .parse::<EntityTagList>()
                .map(|tags| tags.matches(current.token()))
                .unwrap_or(false);
        }

        self.if_modified_since
            .as_deref()
            .and_then(parse_http_date)
            .is_some_and(|since| current.last_modified() <= since)
    }
}
