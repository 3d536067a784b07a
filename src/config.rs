//! Catalogue configuration.
//!
//! ```rust
//! use movie_catalog::config::CatalogConfig;
//!
//! let config = CatalogConfig::default()
//!     .with_base_url("https://movies.example.com/")
//!     .with_list_page_size(20);
//!
//! assert_eq!(
//!     config.location_for("movies", "m1"),
//!     "https://movies.example.com/v1/movies/m1"
//! );
//! ```

use crate::representation::Representation;

pub const MOVIES_PATH: &str = "movies";
pub const ACTORS_PATH: &str = "actors";
pub const ROLES_PATH: &str = "roles";

/// Settings shared by every request the operation handler serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Base URL without trailing slash, e.g. "https://movies.example.com".
    pub base_url: String,

    /// API version segment used in generated URLs. Defaults to "v1".
    pub api_version: String,

    /// Representation used when the request carries no `Accept` header or `*/*`.
    pub default_representation: Representation,

    /// Page size for list operations that don't specify a limit.
    pub list_page_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost".to_string(),
            api_version: "v1".to_string(),
            default_representation: Representation::JsonV1,
            list_page_size: 50,
        }
    }
}

impl CatalogConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_default_representation(mut self, representation: Representation) -> Self {
        self.default_representation = representation;
        self
    }

    /// Page size for unbounded list requests; zero is bumped to one.
    pub fn with_list_page_size(mut self, list_page_size: usize) -> Self {
        self.list_page_size = list_page_size.max(1);
        self
    }

    /// Absolute URL of a resource in a collection.
    pub fn location_for(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url, self.api_version, collection, id
        )
    }

    pub fn movie_location(&self, movie_id: &str) -> String {
        self.location_for(MOVIES_PATH, movie_id)
    }

    pub fn actor_location(&self, actor_id: &str) -> String {
        self.location_for(ACTORS_PATH, actor_id)
    }

    /// Roles are addressed through their movie.
    pub fn role_location(&self, movie_id: &str, role_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.movie_location(movie_id),
            ROLES_PATH,
            role_id
        )
    }
}
