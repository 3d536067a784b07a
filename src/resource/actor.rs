//! Actors, referenced from movie roles by id.

use super::{fingerprint::Fingerprinted, meta::Meta, require_text};
use crate::error::ValidationResult;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const ACTOR: &str = "Actor";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    pub meta: Meta,
}

impl Actor {
    pub fn new(id: impl Into<String>, input: NewActor, meta: Meta) -> ValidationResult<Self> {
        Ok(Self {
            id: id.into(),
            name: require_text("name", &input.name)?,
            birth_name: input.birth_name,
            date_of_birth: input.date_of_birth,
            meta,
        })
    }

    pub fn apply(&mut self, patch: &ActorPatch) -> ValidationResult<()> {
        if let Some(name) = &patch.name {
            self.name = require_text("name", name)?;
        }
        if let Some(birth_name) = &patch.birth_name {
            self.birth_name = Some(birth_name.clone());
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            self.date_of_birth = Some(date_of_birth);
        }
        Ok(())
    }
}

impl Fingerprinted for Actor {
    fn last_modified(&self) -> DateTime<Utc> {
        self.meta.last_modified()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActor {
    pub name: String,
    #[serde(default)]
    pub birth_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

impl NewActor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birth_name: None,
            date_of_birth: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub birth_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}
