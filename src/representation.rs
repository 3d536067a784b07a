//! Versioned output representations and `Accept` negotiation.
//!
//! A [`Representation`] is chosen once per request from the `Accept` header. Each
//! variant is a pure projection of a domain entity into `serde_json::Value`; nothing
//! in here touches storage or fingerprints beyond reading them.
//!
//! | media range                        | representation              |
//! |------------------------------------|-----------------------------|
//! | *(absent)*, `*/*`, `application/*` | configured default          |
//! | `application/json`                 | `JsonV1`                    |
//! | `application/vnd.movies.v1+json`   | `JsonV1`                    |
//! | `application/vnd.movies.v2+json`   | `JsonV2`                    |
//! | anything else                      | not acceptable (406)        |
//!
//! Quality values are honoured: the highest-q acceptable range wins, ties go to the
//! one listed first, and `q=0` excludes a range.

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::resource::{Actor, Meta, Movie, MovieRole, VersionedResource};
use serde_json::{Map, Value, json};
use std::fmt;

pub const JSON_V1_MEDIA_TYPE: &str = "application/vnd.movies.v1+json";
pub const JSON_V2_MEDIA_TYPE: &str = "application/vnd.movies.v2+json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Representation {
    /// Flat entities, actors referenced by id.
    #[default]
    JsonV1,
    /// Adds counts, nested references and `meta` (version, timestamps, location).
    JsonV2,
}

impl Representation {
    /// Pick a representation for an `Accept` header value.
    pub fn negotiate(accept: Option<&str>, default: Representation) -> CatalogResult<Self> {
        let Some(header) = accept.map(str::trim).filter(|h| !h.is_empty()) else {
            return Ok(default);
        };

        let mut best: Option<(f32, Representation)> = None;
        for range in header.split(',') {
            let Some((media_type, quality)) = parse_media_range(range) else {
                continue;
            };
            if quality <= 0.0 {
                continue;
            }
            let Some(candidate) = Self::for_media_type(&media_type, default) else {
                continue;
            };
            if best.is_none_or(|(q, _)| quality > q) {
                best = Some((quality, candidate));
            }
        }

        best.map(|(_, representation)| representation)
            .ok_or_else(|| CatalogError::not_acceptable(header))
    }

    fn for_media_type(media_type: &str, default: Representation) -> Option<Self> {
        match media_type {
            "*/*" | "application/*" => Some(default),
            "application/json" | JSON_V1_MEDIA_TYPE => Some(Representation::JsonV1),
            JSON_V2_MEDIA_TYPE => Some(Representation::JsonV2),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Representation::JsonV1 => JSON_V1_MEDIA_TYPE,
            Representation::JsonV2 => JSON_V2_MEDIA_TYPE,
        }
    }

    pub fn movie(&self, movie: &VersionedResource<Movie>, config: &CatalogConfig) -> Value {
        let resource = movie.resource();
        match self {
            Representation::JsonV1 => json!({
                "id": resource.id,
                "title": resource.title,
                "roles": resource
                    .roles
                    .iter()
                    .map(|role| self.role(&resource.id, role, config))
                    .collect::<Vec<_>>(),
            }),
            Representation::JsonV2 => json!({
                "id": resource.id,
                "title": resource.title,
                "roleCount": resource.roles.len(),
                "roles": resource
                    .roles
                    .iter()
                    .map(|role| self.role(&resource.id, role, config))
                    .collect::<Vec<_>>(),
                "meta": meta_v2(
                    &resource.meta,
                    Some(movie.fingerprint().etag_header()),
                    config.movie_location(&resource.id),
                ),
            }),
        }
    }

    /// A role as it appears inside its movie.
    pub fn role(&self, movie_id: &str, role: &MovieRole, config: &CatalogConfig) -> Value {
        match self {
            Representation::JsonV1 => json!({
                "id": role.id,
                "character": role.character,
                "actorId": role.actor_id,
            }),
            Representation::JsonV2 => json!({
                "id": role.id,
                "character": role.character,
                "actor": role.actor_id.as_ref().map(|id| json!({
                    "id": id,
                    "location": config.actor_location(id),
                })),
                "meta": meta_v2(&role.meta, None, config.role_location(movie_id, &role.id)),
            }),
        }
    }

    pub fn actor(&self, actor: &VersionedResource<Actor>, config: &CatalogConfig) -> Value {
        let resource = actor.resource();
        match self {
            Representation::JsonV1 => json!({
                "id": resource.id,
                "name": resource.name,
            }),
            Representation::JsonV2 => json!({
                "id": resource.id,
                "name": resource.name,
                "birthName": resource.birth_name,
                "dateOfBirth": resource.date_of_birth,
                "meta": meta_v2(
                    &resource.meta,
                    Some(actor.fingerprint().etag_header()),
                    config.actor_location(&resource.id),
                ),
            }),
        }
    }

    /// A page of projected items.
    pub fn list(&self, items: Vec<Value>, total: usize, offset: usize) -> Value {
        match self {
            Representation::JsonV1 => Value::Array(items),
            Representation::JsonV2 => json!({
                "totalResults": total,
                "startIndex": offset,
                "itemsPerPage": items.len(),
                "resources": items,
            }),
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

fn meta_v2(meta: &Meta, version: Option<String>, location: String) -> Value {
    let mut object = Map::new();
    object.insert("resourceType".into(), json!(meta.resource_type()));
    object.insert("created".into(), json!(meta.created()));
    object.insert("lastModified".into(), json!(meta.last_modified()));
    if let Some(version) = version {
        object.insert("version".into(), Value::String(version));
    }
    object.insert("location".into(), Value::String(location));
    Value::Object(object)
}

/// Split `type/subtype;param=...;q=0.5` into lowercase media type and quality.
///
/// Unparseable quality values count as 1.0.
fn parse_media_range(range: &str) -> Option<(String, f32)> {
    let mut parts = range.split(';');
    let media_type = parts.next()?.trim().to_ascii_lowercase();
    if media_type.is_empty() {
        return None;
    }

    let quality = parts
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
        .and_then(|(_, value)| value.trim().parse::<f32>().ok())
        .unwrap_or(1.0);

    Some((media_type, quality))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{NewActor, NewMovie, NewRole};
    use chrono::{TimeZone, Utc};

    fn negotiate(accept: Option<&str>) -> CatalogResult<Representation> {
        Representation::negotiate(accept, Representation::JsonV1)
    }

    #[test]
    fn test_negotiation_defaults() {
        assert_eq!(negotiate(None).unwrap(), Representation::JsonV1);
        assert_eq!(negotiate(Some("")).unwrap(), Representation::JsonV1);
        assert_eq!(negotiate(Some("*/*")).unwrap(), Representation::JsonV1);
        assert_eq!(
            Representation::negotiate(Some("*/*"), Representation::JsonV2).unwrap(),
            Representation::JsonV2
        );
        assert_eq!(
            negotiate(Some("application/json")).unwrap(),
            Representation::JsonV1
        );
    }

    #[test]
    fn test_negotiation_vendor_types_and_quality() {
        assert_eq!(
            negotiate(Some("application/vnd.movies.v2+json")).unwrap(),
            Representation::JsonV2
        );
        assert_eq!(
            negotiate(Some(
                "application/vnd.movies.v1+json;q=0.5, application/vnd.movies.v2+json"
            ))
            .unwrap(),
            Representation::JsonV2
        );
        assert_eq!(
            negotiate(Some("application/xml, application/vnd.movies.v1+json;q=0.1")).unwrap(),
            Representation::JsonV1
        );
        assert_eq!(
            negotiate(Some("APPLICATION/VND.MOVIES.V2+JSON")).unwrap(),
            Representation::JsonV2
        );
    }

    #[test]
    fn test_negotiation_not_acceptable() {
        let error = negotiate(Some("application/xml")).unwrap_err();
        assert!(matches!(error, CatalogError::NotAcceptable { .. }));

        assert!(negotiate(Some("application/json;q=0")).is_err());
    }

    fn rocky() -> VersionedResource<Movie> {
        let stamp = Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, 9).unwrap();
        let mut movie = Movie::new(
            "m1",
            NewMovie {
                title: "rocky27".into(),
            },
            Meta::created_at("Movie", stamp).unwrap(),
        )
        .unwrap();
        movie.roles.push(
            MovieRole::new(
                "r1",
                NewRole::character("challenger").played_by("a1"),
                Meta::created_at("MovieRole", stamp).unwrap(),
            )
            .unwrap(),
        );
        movie.roles.push(
            MovieRole::new(
                "r2",
                NewRole::character("champion"),
                Meta::created_at("MovieRole", stamp).unwrap(),
            )
            .unwrap(),
        );
        VersionedResource::new(movie)
    }

    #[test]
    fn test_movie_v1_projection() {
        let value = Representation::JsonV1.movie(&rocky(), &CatalogConfig::default());
        assert_eq!(
            value,
            json!({
                "id": "m1",
                "title": "rocky27",
                "roles": [
                    {"id": "r1", "character": "challenger", "actorId": "a1"},
                    {"id": "r2", "character": "champion", "actorId": null},
                ],
            })
        );
    }

    #[test]
    fn test_movie_v2_projection() {
        let movie = rocky();
        let value = Representation::JsonV2.movie(&movie, &CatalogConfig::default());

        assert_eq!(value["roleCount"], 2);
        assert_eq!(value["roles"][0]["actor"]["id"], "a1");
        assert!(value["roles"][1]["actor"].is_null());
        assert_eq!(value["meta"]["lastModified"], "2016-01-06T06:13:09Z");
        assert_eq!(value["meta"]["version"], movie.fingerprint().etag_header());
        assert_eq!(value["meta"]["location"], "https://localhost/v1/movies/m1");
        assert_eq!(
            value["roles"][0]["meta"]["location"],
            "https://localhost/v1/movies/m1/roles/r1"
        );
    }

    #[test]
    fn test_actor_projections() {
        let stamp = Utc.with_ymd_and_hms(2016, 1, 6, 0, 0, 0).unwrap();
        let actor = VersionedResource::new(
            Actor::new(
                "a1",
                NewActor::named("Carl Weathers"),
                Meta::created_at("Actor", stamp).unwrap(),
            )
            .unwrap(),
        );
        let config = CatalogConfig::default();

        assert_eq!(
            Representation::JsonV1.actor(&actor, &config),
            json!({"id": "a1", "name": "Carl Weathers"})
        );
        let v2 = Representation::JsonV2.actor(&actor, &config);
        assert!(v2["birthName"].is_null());
        assert_eq!(v2["meta"]["resourceType"], "Actor");
    }

    #[test]
    fn test_list_envelopes() {
        let items = vec![json!({"id": "a"}), json!({"id": "b"})];
        assert_eq!(
            Representation::JsonV1.list(items.clone(), 5, 2),
            json!([{"id": "a"}, {"id": "b"}])
        );
        let v2 = Representation::JsonV2.list(items, 5, 2);
        assert_eq!(v2["totalResults"], 5);
        assert_eq!(v2["itemsPerPage"], 2);
    }
}
