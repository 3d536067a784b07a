//! Entity tags for catalogue resources.
//!
//! The opaque half of a [`ResourceFingerprint`](super::fingerprint::ResourceFingerprint)
//! is a content hash of the resource's stored state. This module owns that token and
//! the two textual forms it travels in:
//!
//! * [`RawVersion`] - the bare opaque value (`"abc123"`), used internally and in `meta.version`
//! * [`HttpVersion`] - the weak entity-tag form (`W/"abc123"`), used in `ETag` headers
//!
//! Phantom types keep the two forms apart at compile time while still allowing
//! cross-format equality, since both describe the same opaque token.
//!
//! ```rust
//! use movie_catalog::resource::version::{HttpVersion, RawVersion};
//!
//! let raw = RawVersion::from_content(br#"{"id":"m1","title":"rocky27"}"#);
//! let etag = HttpVersion::from(raw.clone());
//! assert!(etag.to_string().starts_with("W/\""));
//!
//! let echoed: HttpVersion = etag.to_string().parse().unwrap();
//! assert_eq!(echoed, raw);
//! ```

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::{fmt, marker::PhantomData, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Http;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Raw;

/// Opaque version token with a compile-time format marker.
#[derive(Debug, Clone, Eq, Hash)]
pub struct ResourceVersion<Format> {
    opaque: String,
    #[allow(dead_code)]
    _format: PhantomData<Format>,
}

/// Weak entity-tag form (`W/"abc123"`).
pub type HttpVersion = ResourceVersion<Http>;

/// Bare opaque form (`abc123`).
pub type RawVersion = ResourceVersion<Raw>;

impl<Format> ResourceVersion<Format> {
    /// Hash resource content into a version token.
    ///
    /// SHA-256 over the bytes, first 8 bytes base64-encoded. Identical content always
    /// yields the identical token.
    pub fn from_content(content: &[u8]) -> RawVersion {
        let mut hasher = Sha256::new();
        hasher.update(content);
        let hash = hasher.finalize();
        let encoded = BASE64.encode(&hash[..8]);

        ResourceVersion {
            opaque: encoded,
            _format: PhantomData,
        }
    }

    /// Wrap a pre-computed token (sequence number, stored hash, ...).
    pub fn from_hash(hash_string: impl AsRef<str>) -> RawVersion {
        ResourceVersion {
            opaque: hash_string.as_ref().to_string(),
            _format: PhantomData,
        }
    }

    /// The opaque token. Only meaningful for equality comparisons.
    pub fn as_str(&self) -> &str {
        &self.opaque
    }
}

impl fmt::Display for ResourceVersion<Raw> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opaque)
    }
}

impl fmt::Display for ResourceVersion<Http> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W/\"{}\"", self.opaque)
    }
}

impl FromStr for ResourceVersion<Raw> {
    type Err = VersionError;

    fn from_str(version_str: &str) -> Result<Self, Self::Err> {
        let trimmed = version_str.trim();

        if trimmed.is_empty() {
            return Err(VersionError::ParseError(
                "Version string cannot be empty".to_string(),
            ));
        }

        Ok(ResourceVersion {
            opaque: trimmed.to_string(),
            _format: PhantomData,
        })
    }
}

impl FromStr for ResourceVersion<Http> {
    type Err = VersionError;

    fn from_str(etag_header: &str) -> Result<Self, Self::Err> {
        let trimmed = etag_header.trim();
        let etag_value = trimmed.strip_prefix("W/").unwrap_or(trimmed);

        if etag_value.len() < 2 || !etag_value.starts_with('"') || !etag_value.ends_with('"') {
            return Err(VersionError::InvalidEtagFormat(etag_header.to_string()));
        }

        let opaque = &etag_value[1..etag_value.len() - 1];

        if opaque.is_empty() || opaque.contains('"') {
            return Err(VersionError::InvalidEtagFormat(etag_header.to_string()));
        }

        Ok(ResourceVersion {
            opaque: opaque.to_string(),
            _format: PhantomData,
        })
    }
}

impl From<ResourceVersion<Raw>> for ResourceVersion<Http> {
    fn from(raw: ResourceVersion<Raw>) -> Self {
        ResourceVersion {
            opaque: raw.opaque,
            _format: PhantomData,
        }
    }
}

impl From<ResourceVersion<Http>> for ResourceVersion<Raw> {
    fn from(http: ResourceVersion<Http>) -> Self {
        ResourceVersion {
            opaque: http.opaque,
            _format: PhantomData,
        }
    }
}

// Versions are equal when their opaque tokens match, whatever the format.
impl<F1, F2> PartialEq<ResourceVersion<F2>> for ResourceVersion<F1> {
    fn eq(&self, other: &ResourceVersion<F2>) -> bool {
        self.opaque == other.opaque
    }
}

impl<Format> Serialize for ResourceVersion<Format> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.opaque.serialize(serializer)
    }
}

impl<'de, Format> Deserialize<'de> for ResourceVersion<Format> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opaque = String::deserialize(deserializer)?;
        Ok(ResourceVersion {
            opaque,
            _format: PhantomData,
        })
    }
}

/// A parsed `If-Match` / `If-None-Match` header value.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityTagList {
    /// `*`: matches any current representation.
    Any,
    /// One or more listed tags.
    Tags(Vec<HttpVersion>),
}

impl EntityTagList {
    /// Whether `current` is matched by this list.
    ///
    /// Comparison is on the opaque value only; weak and strong forms of the same
    /// token match each other.
    pub fn matches(&self, current: &RawVersion) -> bool {
        match self {
            EntityTagList::Any => true,
            EntityTagList::Tags(tags) => tags.iter().any(|tag| tag == current),
        }
    }
}

impl FromStr for EntityTagList {
    type Err = VersionError;

    fn from_str(header: &str) -> Result<Self, Self::Err> {
        let trimmed = header.trim();
        if trimmed == "*" {
            return Ok(EntityTagList::Any);
        }

        let tags = split_entity_tags(trimmed)
            .ok_or_else(|| VersionError::InvalidEtagFormat(header.to_string()))?
            .into_iter()
            .map(str::parse::<HttpVersion>)
            .collect::<Result<Vec<_>, _>>()?;

        if tags.is_empty() {
            return Err(VersionError::InvalidEtagFormat(header.to_string()));
        }

        Ok(EntityTagList::Tags(tags))
    }
}

/// Split a comma separated tag list without breaking on commas inside quotes.
fn split_entity_tags(header: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (index, ch) in header.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(header[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }

    if in_quotes {
        return None;
    }
    parts.push(header[start..].trim());

    Some(parts.into_iter().filter(|part| !part.is_empty()).collect())
}

/// Errors raised while parsing version tokens.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VersionError {
    #[error("Invalid ETag format: {0}")]
    InvalidEtagFormat(String),

    #[error("Failed to parse version: {0}")]
    ParseError(String),
}
