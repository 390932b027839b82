use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// A single todo item as persisted in the backing file.
///
/// `id` is assigned by the store at creation time and never changes.
/// `completed` defaults so that records written without the field decode
/// as not-completed rather than failing the whole collection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Creation input: `id` is never client-supplied.
///
/// Fields default through serde so a missing key reaches `validate`
/// (and comes back as a 400) instead of being rejected by the JSON
/// extractor with a framework-shaped error.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct NewTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl NewTodo {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.title.trim().is_empty() {
            return Err(ModelError::Validation("title is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(ModelError::Validation("description is required".into()));
        }
        Ok(())
    }
}

/// Partial update input. All fields optional; the store decides how
/// absence is interpreted per field.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}
