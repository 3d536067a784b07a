//! Movies and the roles embedded in them.
//!
//! A [`Movie`] is a container: its roles are stored inside the movie document, so
//! every role mutation rewrites (and restamps) the movie. That is what lets a
//! conditional request made against the movie's fingerprint detect concurrent role
//! appends.

use super::{fingerprint::Fingerprinted, meta::Meta, require_text};
use crate::error::ValidationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MOVIE: &str = "Movie";
pub const MOVIE_ROLE: &str = "MovieRole";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub roles: Vec<MovieRole>,
    pub meta: Meta,
}

impl Movie {
    pub fn new(id: impl Into<String>, input: NewMovie, meta: Meta) -> ValidationResult<Self> {
        Ok(Self {
            id: id.into(),
            title: require_text("title", &input.title)?,
            roles: Vec::new(),
            meta,
        })
    }

    /// Apply a partial update. Absent fields are left alone.
    pub fn apply(&mut self, patch: &MoviePatch) -> ValidationResult<()> {
        if let Some(title) = &patch.title {
            self.title = require_text("title", title)?;
        }
        Ok(())
    }

    pub fn role(&self, role_id: &str) -> Option<&MovieRole> {
        self.roles.iter().find(|role| role.id == role_id)
    }

    pub fn role_mut(&mut self, role_id: &str) -> Option<&mut MovieRole> {
        self.roles.iter_mut().find(|role| role.id == role_id)
    }

    /// Remove and return a role.
    pub fn take_role(&mut self, role_id: &str) -> Option<MovieRole> {
        let index = self.roles.iter().position(|role| role.id == role_id)?;
        Some(self.roles.remove(index))
    }

    pub fn references_actor(&self, actor_id: &str) -> bool {
        self.roles
            .iter()
            .any(|role| role.actor_id.as_deref() == Some(actor_id))
    }
}

impl Fingerprinted for Movie {
    fn last_modified(&self) -> DateTime<Utc> {
        self.meta.last_modified()
    }
}

/// A character played in a movie, optionally by a known actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRole {
    pub id: String,
    pub character: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    pub meta: Meta,
}

impl MovieRole {
    pub fn new(id: impl Into<String>, input: NewRole, meta: Meta) -> ValidationResult<Self> {
        Ok(Self {
            id: id.into(),
            character: require_text("character", &input.character)?,
            actor_id: input.actor_id,
            meta,
        })
    }

    pub fn apply(&mut self, patch: &RolePatch) -> ValidationResult<()> {
        if let Some(character) = &patch.character {
            self.character = require_text("character", character)?;
        }
        if let Some(actor_id) = &patch.actor_id {
            self.actor_id = Some(actor_id.clone());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePatch {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRole {
    pub character: String,
    #[serde(default)]
    pub actor_id: Option<String>,
}

impl NewRole {
    pub fn character(character: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            actor_id: None,
        }
    }

    pub fn played_by(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePatch {
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub actor_id: Option<String>,
}
