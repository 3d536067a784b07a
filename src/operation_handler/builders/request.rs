//! Request builder utilities for OperationRequest
//!
//! One constructor per operation plus `with_*` setters for headers, pagination and
//! request id.

use crate::{
    operation_handler::core::{OperationRequest, OperationType, PageQuery, RequestHeaders},
    resource::ResourceFingerprint,
};
use serde_json::Value;

impl OperationRequest {
    fn new(operation: OperationType) -> Self {
        Self {
            operation,
            resource_id: None,
            role_id: None,
            data: None,
            query: None,
            headers: RequestHeaders::default(),
            request_id: None,
        }
    }

    fn targeting(operation: OperationType, resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(resource_id.into()),
            ..Self::new(operation)
        }
    }

    fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    fn with_role(mut self, role_id: impl Into<String>) -> Self {
        self.role_id = Some(role_id.into());
        self
    }

    pub fn create_movie(data: Value) -> Self {
        Self::new(OperationType::CreateMovie).with_data(data)
    }

    pub fn get_movie(movie_id: impl Into<String>) -> Self {
        Self::targeting(OperationType::GetMovie, movie_id)
    }

    pub fn list_movies() -> Self {
        Self::new(OperationType::ListMovies)
    }

    pub fn update_movie(movie_id: impl Into<String>, data: Value) -> Self {
        Self::targeting(OperationType::UpdateMovie, movie_id).with_data(data)
    }

    pub fn delete_movie(movie_id: impl Into<String>) -> Self {
        Self::targeting(OperationType::DeleteMovie, movie_id)
    }

    pub fn add_role(movie_id: impl Into<String>, data: Value) -> Self {
        Self::targeting(OperationType::AddRole, movie_id).with_data(data)
    }

    pub fn update_role(
        movie_id: impl Into<String>,
        role_id: impl Into<String>,
        data: Value,
    ) -> Self {
        Self::targeting(OperationType::UpdateRole, movie_id)
            .with_role(role_id)
            .with_data(data)
    }

    pub fn remove_role(movie_id: impl Into<String>, role_id: impl Into<String>) -> Self {
        Self::targeting(OperationType::RemoveRole, movie_id).with_role(role_id)
    }

    pub fn create_actor(data: Value) -> Self {
        Self::new(OperationType::CreateActor).with_data(data)
    }

    pub fn get_actor(actor_id: impl Into<String>) -> Self {
        Self::targeting(OperationType::GetActor, actor_id)
    }

    pub fn list_actors() -> Self {
        Self::new(OperationType::ListActors)
    }

    pub fn update_actor(actor_id: impl Into<String>, data: Value) -> Self {
        Self::targeting(OperationType::UpdateActor, actor_id).with_data(data)
    }

    pub fn delete_actor(actor_id: impl Into<String>) -> Self {
        Self::targeting(OperationType::DeleteActor, actor_id)
    }

    /// Set the request ID for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_query(mut self, query: PageQuery) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.headers.accept = Some(accept.into());
        self
    }

    pub fn with_if_unmodified_since(mut self, value: impl Into<String>) -> Self {
        self.headers.if_unmodified_since = Some(value.into());
        self
    }

    pub fn with_if_match(mut self, value: impl Into<String>) -> Self {
        self.headers.if_match = Some(value.into());
        self
    }

    pub fn with_if_none_match(mut self, value: impl Into<String>) -> Self {
        self.headers.if_none_match = Some(value.into());
        self
    }

    pub fn with_if_modified_since(mut self, value: impl Into<String>) -> Self {
        self.headers.if_modified_since = Some(value.into());
        self
    }

    /// Present a previously received fingerprint's `Last-Modified` as
    /// `If-Unmodified-Since`.
    pub fn unmodified_since(self, fingerprint: &ResourceFingerprint) -> Self {
        self.with_if_unmodified_since(fingerprint.last_modified_header())
    }
}
