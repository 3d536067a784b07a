//! Resource fingerprints.
//!
//! A [`ResourceFingerprint`] summarises a resource's current persisted state as an
//! opaque token plus the stored last-modification timestamp. Fingerprints are always
//! derived from explicit state through [`fingerprint_of`]; they are never stored on
//! their own and go stale the moment the resource (or anything it contains) changes.
//!
//! The HTTP surface of a fingerprint is two headers:
//!
//! * `ETag: W/"<token>"`
//! * `Last-Modified: Wed, 06 Jan 2016 06:13:09 GMT`
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use movie_catalog::resource::fingerprint::{format_http_date, parse_http_date};
//!
//! let stamp = Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, 9).unwrap();
//! let header = format_http_date(&stamp);
//! assert_eq!(header, "Wed, 06 Jan 2016 06:13:09 GMT");
//! assert_eq!(parse_http_date(&header), Some(stamp));
//! ```

use crate::resource::version::{HttpVersion, RawVersion};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC850_DATE: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_DATE: &str = "%a %b %e %H:%M:%S %Y";

/// Opaque token plus last-modification timestamp of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFingerprint {
    token: RawVersion,
    last_modified: DateTime<Utc>,
}

impl ResourceFingerprint {
    pub fn new(token: RawVersion, last_modified: DateTime<Utc>) -> Self {
        Self {
            token,
            last_modified,
        }
    }

    pub fn token(&self) -> &RawVersion {
        &self.token
    }

    /// Stored timestamp at full precision.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// The token in weak entity-tag form.
    pub fn etag(&self) -> HttpVersion {
        HttpVersion::from(self.token.clone())
    }

    /// Value for an `ETag` response header.
    pub fn etag_header(&self) -> String {
        self.etag().to_string()
    }

    /// Value for a `Last-Modified` response header (second precision, GMT).
    pub fn last_modified_header(&self) -> String {
        format_http_date(&self.last_modified)
    }
}

impl fmt::Display for ResourceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {}",
            self.etag(),
            self.last_modified.to_rfc3339()
        )
    }
}

/// State that can be fingerprinted: anything serializable that knows its own
/// stored last-modification timestamp.
pub trait Fingerprinted: Serialize {
    fn last_modified(&self) -> DateTime<Utc>;
}

/// Compute the fingerprint of a resource's current state.
///
/// The token hashes the resource's canonical JSON, timestamps included, so any
/// observable field change (or a touch of the stamp alone) changes it. The timestamp
/// is taken as stored, with no truncation.
pub fn fingerprint_of<R: Fingerprinted + ?Sized>(resource: &R) -> ResourceFingerprint {
    let last_modified = resource.last_modified();
    let token = match serde_json::to_vec(resource) {
        Ok(content) => RawVersion::from_content(&content),
        Err(_) => {
            let nanos = last_modified
                .timestamp_nanos_opt()
                .unwrap_or_else(|| last_modified.timestamp_micros());
            RawVersion::from_hash(format!("ts-{}", nanos))
        }
    };

    ResourceFingerprint::new(token, last_modified)
}

/// Format a timestamp as an HTTP date (`IMF-fixdate`), always GMT.
pub fn format_http_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(IMF_FIXDATE).to_string()
}

/// Parse an HTTP date header value.
///
/// Accepts RFC 2822 dates (which covers `IMF-fixdate` and numeric zones) plus the
/// obsolete RFC 850 and asctime forms that HTTP recipients must still accept.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    [RFC850_DATE, ASCTIME_DATE]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[derive(Serialize)]
    struct Doc {
        title: String,
        last_modified: DateTime<Utc>,
    }

    impl Fingerprinted for Doc {
        fn last_modified(&self) -> DateTime<Utc> {
            self.last_modified
        }
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, 9).unwrap()
    }

    #[test]
    fn test_identical_state_identical_fingerprint() {
        let a = Doc {
            title: "rocky27".into(),
            last_modified: stamp(),
        };
        let b = Doc {
            title: "rocky27".into(),
            last_modified: stamp(),
        };

        assert_eq!(fingerprint_of(&a), fingerprint_of(&b));
    }

    #[test]
    fn test_field_change_changes_token() {
        let a = Doc {
            title: "rocky27".into(),
            last_modified: stamp(),
        };
        let b = Doc {
            title: "rocky28".into(),
            last_modified: stamp(),
        };

        assert_ne!(fingerprint_of(&a).token(), fingerprint_of(&b).token());
    }

    #[test]
    fn test_sub_second_precision_is_kept() {
        let early = stamp() + Duration::milliseconds(100);
        let late = stamp() + Duration::milliseconds(900);
        let a = Doc {
            title: "rocky27".into(),
            last_modified: early,
        };
        let b = Doc {
            title: "rocky27".into(),
            last_modified: late,
        };

        let fa = fingerprint_of(&a);
        let fb = fingerprint_of(&b);
        assert_eq!(fa.last_modified(), early);
        assert_ne!(fa, fb);
        assert_ne!(fa.token(), fb.token());
    }

    #[test]
    fn test_headers() {
        let fp = ResourceFingerprint::new(RawVersion::from_hash("abc"), stamp());
        assert_eq!(fp.etag_header(), "W/\"abc\"");
        assert_eq!(fp.last_modified_header(), "Wed, 06 Jan 2016 06:13:09 GMT");
    }

    #[test]
    fn test_parse_http_date_forms() {
        let expected = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();

        assert_eq!(
            parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT"),
            Some(expected)
        );
        assert_eq!(
            parse_http_date("Sun, 06 Nov 1994 08:49:37 +0000"),
            Some(expected)
        );
        assert_eq!(
            parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT"),
            Some(expected)
        );
        assert_eq!(parse_http_date("Sun Nov  6 08:49:37 1994"), Some(expected));
        assert_eq!(
            parse_http_date("Wed Nov 16 08:49:37 1994"),
            Some(expected + Duration::days(10))
        );
    }

    #[test]
    fn test_parse_http_date_rejects_garbage() {
        assert_eq!(parse_http_date("not-a-date"), None);
        assert_eq!(parse_http_date(""), None);
        assert_eq!(parse_http_date("2016-01-06T06:13:09Z"), None);
    }
}
