//! Stored resource metadata.
//!
//! Every persisted document carries a `meta` object with its type and two
//! timestamps. `lastModified` is the document's *stamp*: the value fingerprints are
//! built from and the value the storage layer compares on conditional writes.
//! Versions and locations are not stored; they are derived on every read.

use crate::error::{ValidationError, ValidationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(rename = "resourceType")]
    resource_type: String,
    created: DateTime<Utc>,
    #[serde(rename = "lastModified")]
    last_modified: DateTime<Utc>,
}

impl Meta {
    /// Build validated metadata.
    ///
    /// The resource type must be a non-empty identifier and `last_modified` may not
    /// precede `created`.
    pub fn new(
        resource_type: impl Into<String>,
        created: DateTime<Utc>,
        last_modified: DateTime<Utc>,
    ) -> ValidationResult<Self> {
        let resource_type = resource_type.into();
        Self::validate_resource_type(&resource_type)?;
        Self::validate_timestamps(created, last_modified)?;

        Ok(Self {
            resource_type,
            created,
            last_modified,
        })
    }

    /// Metadata for a resource created at `stamp`.
    pub fn created_at(resource_type: impl Into<String>, stamp: DateTime<Utc>) -> ValidationResult<Self> {
        Self::new(resource_type, stamp, stamp)
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Copy of this metadata modified at `stamp`, creation time preserved.
    pub fn touched(&self, stamp: DateTime<Utc>) -> ValidationResult<Self> {
        Self::new(self.resource_type.clone(), self.created, stamp)
    }

    fn validate_resource_type(resource_type: &str) -> ValidationResult<()> {
        if resource_type.is_empty() {
            return Err(ValidationError::MissingResourceType);
        }

        if !resource_type.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ValidationError::InvalidResourceType {
                resource_type: resource_type.to_string(),
            });
        }

        Ok(())
    }

    fn validate_timestamps(
        created: DateTime<Utc>,
        last_modified: DateTime<Utc>,
    ) -> ValidationResult<()> {
        if last_modified < created {
            return Err(ValidationError::Custom {
                message: "Last modified timestamp cannot be before created timestamp".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Meta(resourceType={}, created={}, lastModified={})",
            self.resource_type,
            self.created.to_rfc3339(),
            self.last_modified.to_rfc3339()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_valid_meta() {
        let created = Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, 9).unwrap();
        let meta = Meta::new("Movie", created, created + Duration::seconds(5)).unwrap();

        assert_eq!(meta.resource_type(), "Movie");
        assert_eq!(meta.created(), created);
        assert_eq!(meta.last_modified(), created + Duration::seconds(5));
    }

    #[test]
    fn test_invalid_meta() {
        let created = Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, 9).unwrap();

        assert_eq!(
            Meta::created_at("", created),
            Err(ValidationError::MissingResourceType)
        );
        assert!(matches!(
            Meta::created_at("Movie Role", created),
            Err(ValidationError::InvalidResourceType { .. })
        ));
        assert!(Meta::new("Movie", created, created - Duration::seconds(1)).is_err());
    }

    #[test]
    fn test_touch_preserves_created() {
        let created = Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, 9).unwrap();
        let meta = Meta::created_at("Movie", created).unwrap();
        let touched = meta.touched(created + Duration::seconds(1)).unwrap();

        assert_eq!(touched.created(), created);
        assert_eq!(touched.last_modified(), created + Duration::seconds(1));
    }

    #[test]
    fn test_serialized_field_names() {
        let created = Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, 9).unwrap();
        let value = serde_json::to_value(Meta::created_at("Actor", created).unwrap()).unwrap();

        assert_eq!(value["resourceType"], "Actor");
        assert!(value.get("lastModified").is_some());
    }
}
