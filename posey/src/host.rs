/// The boundary to the application that owns the live scene.
///
/// The core only ever reads the selection and world transforms and writes
/// world transforms back; everything else about a host is opaque. Objects are
/// addressed by their full live name.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::PoseError;
use crate::matrix::Transform;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("object '{0}' does not exist")]
    UnknownObject(String),

    #[error("host rejected transform for '{object}': {reason}")]
    Rejected { object: String, reason: String },

    #[error("invalid scene data: {0}")]
    InvalidScene(String),
}

/// Capabilities the pose core needs from a host application.
pub trait HostAdapter {
    /// Currently selected objects, in selection order.
    fn selection(&self) -> Vec<String>;

    fn world_transform(&self, object: &str) -> Result<Transform, HostError>;

    fn set_world_transform(&mut self, object: &str, transform: &Transform)
        -> Result<(), HostError>;

    fn object_exists(&self, object: &str) -> bool;
}

/// Which host binding to drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKind {
    /// A JSON scene file read and written by [`SceneHost`].
    #[default]
    SceneFile,
    /// [`StubHost`]: no objects, nothing selected.
    Stub,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SceneObject {
    name: String,
    matrix: [f64; 16],
}

/// An in-memory scene of named objects with world transforms.
///
/// Serialized as `{"objects": [{"name": .., "matrix": [16]}], "selection": [..]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneHost {
    #[serde(default)]
    objects: Vec<SceneObject>,
    #[serde(default)]
    selection: Vec<String>,
}

impl SceneHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, or move an existing one.
    pub fn insert(&mut self, name: &str, transform: Transform) {
        let matrix = transform.to_row_major();
        match self.objects.iter_mut().find(|o| o.name == name) {
            Some(object) => object.matrix = matrix,
            None => self.objects.push(SceneObject {
                name: name.to_string(),
                matrix,
            }),
        }
    }

    pub fn with_object(mut self, name: &str, transform: Transform) -> Self {
        self.insert(name, transform);
        self
    }

    /// Replace the selection.
    pub fn select<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = names.into_iter().map(Into::into).collect();
    }

    pub fn get(&self, name: &str) -> Option<Transform> {
        self.objects
            .iter()
            .find(|o| o.name == name)
            .map(|o| Transform::from_row_major(&o.matrix))
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|o| o.name.as_str())
    }

    pub fn from_json(s: &str) -> Result<Self, HostError> {
        serde_json::from_str(s).map_err(|e| HostError::InvalidScene(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, HostError> {
        serde_json::to_string_pretty(self).map_err(|e| HostError::InvalidScene(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, PoseError> {
        let text = fs::read_to_string(path).map_err(|source| PoseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), PoseError> {
        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(|source| PoseError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl HostAdapter for SceneHost {
    fn selection(&self) -> Vec<String> {
        self.selection.clone()
    }

    fn world_transform(&self, object: &str) -> Result<Transform, HostError> {
        self.get(object)
            .ok_or_else(|| HostError::UnknownObject(object.to_string()))
    }

    fn set_world_transform(
        &mut self,
        object: &str,
        transform: &Transform,
    ) -> Result<(), HostError> {
        let entry = self
            .objects
            .iter_mut()
            .find(|o| o.name == object)
            .ok_or_else(|| HostError::UnknownObject(object.to_string()))?;
        entry.matrix = transform.to_row_major();
        Ok(())
    }

    fn object_exists(&self, object: &str) -> bool {
        self.objects.iter().any(|o| o.name == object)
    }
}

/// A host with an empty scene. Every copy fails with an empty selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubHost;

impl HostAdapter for StubHost {
    fn selection(&self) -> Vec<String> {
        Vec::new()
    }

    fn world_transform(&self, object: &str) -> Result<Transform, HostError> {
        Err(HostError::UnknownObject(object.to_string()))
    }

    fn set_world_transform(
        &mut self,
        object: &str,
        _transform: &Transform,
    ) -> Result<(), HostError> {
        Err(HostError::UnknownObject(object.to_string()))
    }

    fn object_exists(&self, _object: &str) -> bool {
        false
    }
}
