//! Resources paired with their fingerprint.
//!
//! ```rust
//! use chrono::Utc;
//! use movie_catalog::resource::{Meta, Movie, NewMovie, VersionedResource};
//!
//! let meta = Meta::created_at("Movie", Utc::now()).unwrap();
//! let movie = Movie::new("m1", NewMovie { title: "rocky27".into() }, meta).unwrap();
//!
//! let versioned = VersionedResource::new(movie);
//! println!("ETag: {}", versioned.fingerprint().etag_header());
//! ```

use super::fingerprint::{Fingerprinted, ResourceFingerprint, fingerprint_of};

/// A resource together with the fingerprint of the state it was read or written in.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedResource<T> {
    resource: T,
    fingerprint: ResourceFingerprint,
}

impl<T: Fingerprinted> VersionedResource<T> {
    /// Wrap a resource, computing its fingerprint from its current state.
    pub fn new(resource: T) -> Self {
        let fingerprint = fingerprint_of(&resource);
        Self {
            resource,
            fingerprint,
        }
    }
}

impl<T> VersionedResource<T> {
    pub fn resource(&self) -> &T {
        &self.resource
    }

    pub fn fingerprint(&self) -> &ResourceFingerprint {
        &self.fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Meta, Movie, NewMovie};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_fingerprint_tracks_state() {
        let stamp = Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, 9).unwrap();
        let movie = Movie::new(
            "m1",
            NewMovie {
                title: "rocky27".into(),
            },
            Meta::created_at("Movie", stamp).unwrap(),
        )
        .unwrap();

        let versioned = VersionedResource::new(movie.clone());
        assert_eq!(versioned.fingerprint().last_modified(), stamp);

        let mut touched = movie;
        touched.meta = touched.meta.touched(stamp + Duration::seconds(1)).unwrap();
        let updated = VersionedResource::new(touched);

        assert!(updated.fingerprint().last_modified() > versioned.fingerprint().last_modified());
        assert_ne!(updated.fingerprint().token(), versioned.fingerprint().token());
    }
}
