//! Catalogue provider with pluggable storage.
//!
//! [`CatalogProvider`] owns the catalogue rules: it stamps metadata, validates
//! references between actors and roles, and runs every conditional mutation as
//!
//! 1. parse the request's preconditions (malformed → error, nothing loaded);
//! 2. load the current document and fingerprint it;
//! 3. ask the guard; a conflict returns without writing;
//! 4. apply the change with a fresh stamp;
//! 5. write it back with `put_if_unmodified` against the stamp from step 2.
//!
//! A mismatch in step 5 means another writer got in between; it is reported as a
//! precondition failure carrying the now-current fingerprint, never retried.
//!
//! Roles live inside their movie's document. Adding, changing or removing a role
//! therefore restamps the movie in the same write, which is what invalidates every
//! fingerprint previously handed out for it.
//!
//! # Example Usage
//!
//! ```rust
//! use movie_catalog::providers::CatalogProvider;
//! use movie_catalog::resource::{ConditionalRequest, NewMovie, NewRole, RequestContext};
//! use movie_catalog::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = CatalogProvider::new(InMemoryStorage::new());
//! let context = RequestContext::with_generated_id();
//!
//! let movie = provider
//!     .create_movie(NewMovie { title: "rocky27".into() }, &context)
//!     .await?;
//!
//! let condition = ConditionalRequest::from_fingerprint(movie.fingerprint());
//! let added = provider
//!     .add_role(&movie.resource().id, NewRole::character("challenger"), &condition, &context)
//!     .await?;
//! assert!(added.is_success());
//!
//! // The fingerprint used above is now stale.
//! let again = provider
//!     .add_role(&movie.resource().id, NewRole::character("challenger"), &condition, &context)
//!     .await?;
//! assert!(again.is_precondition_failed());
//! # Ok(())
//! # }
//! ```

use crate::providers::helpers::MetadataManager;
use crate::providers::{ProviderError, ProviderResult};
use crate::resource::{
    ACTOR, Actor, ActorPatch, ConditionalRequest, ConditionalResult, ConflictReason, Decision,
    Fingerprinted, MOVIE, MOVIE_ROLE, Meta, Movie, MoviePatch, MovieRole, NewActor, NewMovie,
    NewRole, PreconditionConflict, Preconditions, RequestContext, RolePatch, VersionedResource,
    fingerprint_of,
};
use crate::storage::{ConditionalWrite, StorageKey, StorageProvider};
use chrono::{DateTime, Utc};
use log::{debug, info, trace, warn};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Entities stored as top-level documents.
pub trait StoredEntity: Fingerprinted + DeserializeOwned + Send + Sync {
    /// Collection name and `meta.resourceType`.
    const RESOURCE_TYPE: &'static str;

    fn id(&self) -> &str;
    fn meta(&self) -> &Meta;
    fn set_meta(&mut self, meta: Meta);
}

impl StoredEntity for Movie {
    const RESOURCE_TYPE: &'static str = MOVIE;

    fn id(&self) -> &str {
        &self.id
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn set_meta(&mut self, meta: Meta) {
        self.meta = meta;
    }
}

impl StoredEntity for Actor {
    const RESOURCE_TYPE: &'static str = ACTOR;

    fn id(&self) -> &str {
        &self.id
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn set_meta(&mut self, meta: Meta) {
        self.meta = meta;
    }
}

/// One page of a collection listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of documents in the whole collection
    pub total: usize,
    pub offset: usize,
}

/// Result of a role mutation: the restamped movie and the role as written.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleChange {
    pub movie: VersionedResource<Movie>,
    pub role: MovieRole,
}

/// Catalogue provider over a storage backend.
#[derive(Debug, Clone)]
pub struct CatalogProvider<S: StorageProvider> {
    storage: S,
}

impl<S: StorageProvider> MetadataManager for CatalogProvider<S> {}

fn decode<T: StoredEntity>(document: Value) -> ProviderResult<T> {
    serde_json::from_value(document).map_err(|e| {
        ProviderError::invalid_data(format!(
            "Failed to deserialize {}: {}",
            T::RESOURCE_TYPE,
            e
        ))
    })
}

fn encode<T: Serialize>(resource: &T) -> ProviderResult<Value> {
    serde_json::to_value(resource).map_err(|e| ProviderError::Internal {
        message: format!("Failed to serialize resource: {}", e),
    })
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl<S: StorageProvider> CatalogProvider<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ----- movies -----

    pub async fn create_movie(
        &self,
        input: NewMovie,
        context: &RequestContext,
    ) -> ProviderResult<VersionedResource<Movie>> {
        info!(
            "Creating Movie '{}' (request: '{}')",
            input.title, context.request_id
        );
        let movie = Movie::new(new_id(), input, self.creation_meta(MOVIE)?)?;
        self.insert(movie, context).await
    }

    pub async fn get_movie(
        &self,
        id: &str,
        context: &RequestContext,
    ) -> ProviderResult<Option<VersionedResource<Movie>>> {
        debug!("Getting Movie '{}' (request: '{}')", id, context.request_id);
        Ok(self.load::<Movie>(id).await?.map(VersionedResource::new))
    }

    pub async fn list_movies(
        &self,
        offset: usize,
        limit: usize,
        context: &RequestContext,
    ) -> ProviderResult<Page<VersionedResource<Movie>>> {
        self.list_entities(offset, limit, context).await
    }

    pub async fn update_movie(
        &self,
        id: &str,
        patch: MoviePatch,
        condition: &ConditionalRequest,
        context: &RequestContext,
    ) -> ProviderResult<ConditionalResult<VersionedResource<Movie>>> {
        info!("Updating Movie '{}' (request: '{}')", id, context.request_id);
        let preconditions = self.preconditions(condition, context)?;

        let result = self
            .conditional_update::<Movie, _, _>(id, &preconditions, context, |movie, _| {
                Ok(movie.apply(&patch)?)
            })
            .await?;
        Ok(result.map(|(movie, ())| movie))
    }

    pub async fn delete_movie(
        &self,
        id: &str,
        condition: &ConditionalRequest,
        context: &RequestContext,
    ) -> ProviderResult<ConditionalResult<()>> {
        info!("Deleting Movie '{}' (request: '{}')", id, context.request_id);
        let preconditions = self.preconditions(condition, context)?;
        self.conditional_delete::<Movie>(id, &preconditions, context)
            .await
    }

    // ----- roles (embedded in movies) -----

    /// Append a role to a movie. The movie is restamped.
    pub async fn add_role(
        &self,
        movie_id: &str,
        input: NewRole,
        condition: &ConditionalRequest,
        context: &RequestContext,
    ) -> ProviderResult<ConditionalResult<RoleChange>> {
        info!(
            "Adding role '{}' to Movie '{}' (request: '{}')",
            input.character, movie_id, context.request_id
        );
        let preconditions = self.preconditions(condition, context)?;
        if let Some(actor_id) = &input.actor_id {
            self.ensure_actor_exists(actor_id).await?;
        }

        let role_id = new_id();
        let result = self
            .conditional_update::<Movie, _, _>(movie_id, &preconditions, context, |movie, stamp| {
                let role = MovieRole::new(role_id, input, Meta::created_at(MOVIE_ROLE, stamp)?)?;
                movie.roles.push(role.clone());
                Ok(role)
            })
            .await?;
        Ok(result.map(|(movie, role)| RoleChange { movie, role }))
    }

    /// Change one role of a movie. Both the role and the movie are restamped.
    pub async fn update_role(
        &self,
        movie_id: &str,
        role_id: &str,
        patch: RolePatch,
        condition: &ConditionalRequest,
        context: &RequestContext,
    ) -> ProviderResult<ConditionalResult<RoleChange>> {
        info!(
            "Updating role '{}' of Movie '{}' (request: '{}')",
            role_id, movie_id, context.request_id
        );
        let preconditions = self.preconditions(condition, context)?;
        if let Some(actor_id) = &patch.actor_id {
            self.ensure_actor_exists(actor_id).await?;
        }

        let result = self
            .conditional_update::<Movie, _, _>(movie_id, &preconditions, context, |movie, stamp| {
                let role = movie
                    .role_mut(role_id)
                    .ok_or_else(|| ProviderError::not_found(MOVIE_ROLE, role_id))?;
                role.apply(&patch)?;
                role.meta = role.meta.touched(stamp)?;
                Ok(role.clone())
            })
            .await?;
        Ok(result.map(|(movie, role)| RoleChange { movie, role }))
    }

    /// Remove one role from a movie. The movie is restamped.
    pub async fn remove_role(
        &self,
        movie_id: &str,
        role_id: &str,
        condition: &ConditionalRequest,
        context: &RequestContext,
    ) -> ProviderResult<ConditionalResult<VersionedResource<Movie>>> {
        info!(
            "Removing role '{}' from Movie '{}' (request: '{}')",
            role_id, movie_id, context.request_id
        );
        let preconditions = self.preconditions(condition, context)?;

        let result = self
            .conditional_update::<Movie, _, _>(movie_id, &preconditions, context, |movie, _| {
                movie
                    .take_role(role_id)
                    .map(|_| ())
                    .ok_or_else(|| ProviderError::not_found(MOVIE_ROLE, role_id))
            })
            .await?;
        Ok(result.map(|(movie, ())| movie))
    }

    // ----- actors -----

    pub async fn create_actor(
        &self,
        input: NewActor,
        context: &RequestContext,
    ) -> ProviderResult<VersionedResource<Actor>> {
        info!(
            "Creating Actor '{}' (request: '{}')",
            input.name, context.request_id
        );
        let actor = Actor::new(new_id(), input, self.creation_meta(ACTOR)?)?;
        self.insert(actor, context).await
    }

    pub async fn get_actor(
        &self,
        id: &str,
        context: &RequestContext,
    ) -> ProviderResult<Option<VersionedResource<Actor>>> {
        debug!("Getting Actor '{}' (request: '{}')", id, context.request_id);
        Ok(self.load::<Actor>(id).await?.map(VersionedResource::new))
    }

    pub async fn list_actors(
        &self,
        offset: usize,
        limit: usize,
        context: &RequestContext,
    ) -> ProviderResult<Page<VersionedResource<Actor>>> {
        self.list_entities(offset, limit, context).await
    }

    pub async fn update_actor(
        &self,
        id: &str,
        patch: ActorPatch,
        condition: &ConditionalRequest,
        context: &RequestContext,
    ) -> ProviderResult<ConditionalResult<VersionedResource<Actor>>> {
        info!("Updating Actor '{}' (request: '{}')", id, context.request_id);
        let preconditions = self.preconditions(condition, context)?;

        let result = self
            .conditional_update::<Actor, _, _>(id, &preconditions, context, |actor, _| {
                Ok(actor.apply(&patch)?)
            })
            .await?;
        Ok(result.map(|(actor, ())| actor))
    }

    /// Delete an actor. Rejected while any movie role still references it.
    pub async fn delete_actor(
        &self,
        id: &str,
        condition: &ConditionalRequest,
        context: &RequestContext,
    ) -> ProviderResult<ConditionalResult<()>> {
        info!("Deleting Actor '{}' (request: '{}')", id, context.request_id);
        let preconditions = self.preconditions(condition, context)?;

        let referencing = self.movies_referencing(id).await?;
        if !referencing.is_empty() {
            warn!(
                "Refusing to delete Actor '{}' referenced by {} movie(s) (request: '{}')",
                id,
                referencing.len(),
                context.request_id
            );
            return Err(ProviderError::ReferencedResource {
                resource_type: ACTOR.to_string(),
                id: id.to_string(),
                referenced_by: format!("Movie {}", referencing.join(", ")),
            });
        }

        self.conditional_delete::<Actor>(id, &preconditions, context)
            .await
    }

    // ----- internals -----

    fn preconditions(
        &self,
        condition: &ConditionalRequest,
        context: &RequestContext,
    ) -> ProviderResult<Preconditions> {
        condition.parse().map_err(|e| {
            warn!("{} (request: '{}')", e, context.request_id);
            ProviderError::from(e)
        })
    }

    async fn load<T: StoredEntity>(&self, id: &str) -> ProviderResult<Option<T>> {
        let key = StorageKey::new(T::RESOURCE_TYPE, id);
        match self.storage.get(key).await.map_err(ProviderError::storage)? {
            Some(document) => Ok(Some(decode(document)?)),
            None => Ok(None),
        }
    }

    async fn insert<T: StoredEntity>(
        &self,
        entity: T,
        context: &RequestContext,
    ) -> ProviderResult<VersionedResource<T>> {
        let key = StorageKey::new(T::RESOURCE_TYPE, entity.id());
        let document = encode(&entity)?;
        trace!("Create data: {}", document);

        let inserted = self
            .storage
            .put_if_absent(key, document)
            .await
            .map_err(ProviderError::storage)?;
        if !inserted {
            return Err(ProviderError::DuplicateResource {
                resource_type: T::RESOURCE_TYPE.to_string(),
                id: entity.id().to_string(),
            });
        }

        debug!(
            "Created {} '{}' (request: '{}')",
            T::RESOURCE_TYPE,
            entity.id(),
            context.request_id
        );
        Ok(VersionedResource::new(entity))
    }

    async fn list_entities<T: StoredEntity>(
        &self,
        offset: usize,
        limit: usize,
        context: &RequestContext,
    ) -> ProviderResult<Page<VersionedResource<T>>> {
        debug!(
            "Listing {} resources from {} (limit {}) (request: '{}')",
            T::RESOURCE_TYPE,
            offset,
            limit,
            context.request_id
        );
        let prefix = StorageKey::prefix(T::RESOURCE_TYPE);
        let total = self
            .storage
            .count(prefix.clone())
            .await
            .map_err(ProviderError::storage)?;
        let documents = self
            .storage
            .list(prefix, offset, limit)
            .await
            .map_err(ProviderError::storage)?;

        let items = documents
            .into_iter()
            .filter_map(|(key, document)| match decode::<T>(document) {
                Ok(entity) => Some(VersionedResource::new(entity)),
                Err(e) => {
                    warn!("Skipping unreadable document {}: {}", key, e);
                    None
                }
            })
            .collect();

        Ok(Page {
            items,
            total,
            offset,
        })
    }

    /// Guard, mutate, then compare-and-swap on the evaluated stamp.
    ///
    /// `mutate` receives the new stamp; the entity's own `meta` is touched afterwards.
    async fn conditional_update<T, R, F>(
        &self,
        id: &str,
        preconditions: &Preconditions,
        context: &RequestContext,
        mutate: F,
    ) -> ProviderResult<ConditionalResult<(VersionedResource<T>, R)>>
    where
        T: StoredEntity,
        R: Send,
        F: FnOnce(&mut T, DateTime<Utc>) -> ProviderResult<R> + Send,
    {
        let Some(mut current) = self.load::<T>(id).await? else {
            debug!("{} '{}' not found", T::RESOURCE_TYPE, id);
            return Ok(ConditionalResult::NotFound);
        };

        let fingerprint = fingerprint_of(&current);
        if let Decision::Conflict(conflict) = preconditions.check(&fingerprint) {
            warn!(
                "Precondition failed for {} '{}': {} (request: '{}')",
                T::RESOURCE_TYPE,
                id,
                conflict,
                context.request_id
            );
            return Ok(ConditionalResult::PreconditionFailed(conflict));
        }
        debug!(
            "Preconditions hold for {} '{}' at {}",
            T::RESOURCE_TYPE,
            id,
            fingerprint
        );

        let stamp = self.next_stamp(Some(fingerprint.last_modified()));
        let outcome = mutate(&mut current, stamp)?;
        let touched = self.touch_meta(current.meta(), stamp)?;
        current.set_meta(touched);

        let document = encode(&current)?;
        trace!("Update data: {}", document);

        let key = StorageKey::new(T::RESOURCE_TYPE, id);
        let write = self
            .storage
            .put_if_unmodified(key, document, fingerprint.last_modified())
            .await
            .map_err(ProviderError::storage)?;

        match write {
            ConditionalWrite::Applied(_) => Ok(ConditionalResult::Success((
                VersionedResource::new(current),
                outcome,
            ))),
            ConditionalWrite::StampMismatch { .. } => self.lost_race::<T, _>(id, context).await,
            ConditionalWrite::Missing => Ok(ConditionalResult::NotFound),
        }
    }

    async fn conditional_delete<T: StoredEntity>(
        &self,
        id: &str,
        preconditions: &Preconditions,
        context: &RequestContext,
    ) -> ProviderResult<ConditionalResult<()>> {
        let Some(current) = self.load::<T>(id).await? else {
            warn!(
                "Attempted to delete non-existent {} '{}' (request: '{}')",
                T::RESOURCE_TYPE,
                id,
                context.request_id
            );
            return Ok(ConditionalResult::NotFound);
        };

        let fingerprint = fingerprint_of(&current);
        if let Decision::Conflict(conflict) = preconditions.check(&fingerprint) {
            warn!(
                "Precondition failed for {} '{}': {} (request: '{}')",
                T::RESOURCE_TYPE,
                id,
                conflict,
                context.request_id
            );
            return Ok(ConditionalResult::PreconditionFailed(conflict));
        }

        let key = StorageKey::new(T::RESOURCE_TYPE, id);
        let write = self
            .storage
            .delete_if_unmodified(key, fingerprint.last_modified())
            .await
            .map_err(ProviderError::storage)?;

        match write {
            ConditionalWrite::Applied(()) => {
                debug!("Deleted {} '{}'", T::RESOURCE_TYPE, id);
                Ok(ConditionalResult::Success(()))
            }
            ConditionalWrite::StampMismatch { .. } => self.lost_race::<T, _>(id, context).await,
            ConditionalWrite::Missing => Ok(ConditionalResult::NotFound),
        }
    }

    /// The stamp moved between evaluation and write.
    async fn lost_race<T: StoredEntity, X>(
        &self,
        id: &str,
        context: &RequestContext,
    ) -> ProviderResult<ConditionalResult<X>> {
        warn!(
            "Concurrent write to {} '{}' detected (request: '{}')",
            T::RESOURCE_TYPE,
            id,
            context.request_id
        );
        Ok(match self.load::<T>(id).await? {
            Some(latest) => ConditionalResult::PreconditionFailed(PreconditionConflict::new(
                fingerprint_of(&latest),
                ConflictReason::ConcurrentWrite,
            )),
            None => ConditionalResult::NotFound,
        })
    }

    async fn ensure_actor_exists(&self, actor_id: &str) -> ProviderResult<()> {
        let exists = self
            .storage
            .exists(StorageKey::new(ACTOR, actor_id))
            .await
            .map_err(ProviderError::storage)?;
        if exists {
            Ok(())
        } else {
            Err(ProviderError::unknown_reference(ACTOR, "actorId", actor_id))
        }
    }

    async fn movies_referencing(&self, actor_id: &str) -> ProviderResult<Vec<String>> {
        let documents = self
            .storage
            .list(StorageKey::prefix(MOVIE), 0, usize::MAX)
            .await
            .map_err(ProviderError::storage)?;

        let ids = documents
            .into_iter()
            .filter_map(|(key, document)| match decode::<Movie>(document) {
                Ok(movie) => Some(movie),
                Err(e) => {
                    warn!("Skipping unreadable document {}: {}", key, e);
                    None
                }
            })
            .filter(|movie| movie.references_actor(actor_id))
            .map(|movie| movie.id)
            .collect();
        Ok(ids)
    }
}
