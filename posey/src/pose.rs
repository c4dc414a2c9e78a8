/// The pose record: an insertion-ordered map from normalized object name to
/// world transform, plus its JSON encoding.
///
/// Encoded form: `{"hip": [16 row-major values], "spine": [...], ...}`.
/// Order is significant (it drives by-order pasting) and survives a
/// round trip.
use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PoseError;
use crate::matrix::Transform;
use crate::name::normalize;

/// A single object's saved world transform.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseEntry {
    /// Normalized object name.
    pub name: String,
    pub transform: Transform,
}

/// A snapshot of world transforms keyed by normalized object name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    entries: Vec<PoseEntry>,
    index: HashMap<String, usize>,
}

impl Pose {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Capture a pose from `objects` in order, reading each transform with
    /// `lookup`.
    pub fn capture<S, F, E>(objects: &[S], mut lookup: F) -> Result<Pose, PoseError>
    where
        S: AsRef<str>,
        F: FnMut(&str) -> Result<Transform, E>,
        E: Into<PoseError>,
    {
        if objects.is_empty() {
            return Err(PoseError::EmptySelection);
        }

        let mut pose = Pose::new();
        for object in objects {
            let object = object.as_ref();
            let transform = lookup(object).map_err(Into::into)?;
            if pose.insert(object, transform) {
                tracing::warn!(
                    "{} collapses onto an earlier object named '{}'; keeping the later transform",
                    object,
                    normalize(object)
                );
            }
        }

        tracing::debug!("captured pose of {} objects", pose.len());
        Ok(pose)
    }

    /// Insert under the normalized form of `name`.
    ///
    /// A name that is already present keeps its position and takes the new
    /// transform. Returns `true` in that case.
    pub(crate) fn insert(&mut self, name: &str, transform: Transform) -> bool {
        let key = normalize(name);
        if let Some(&i) = self.index.get(key) {
            self.entries[i].transform = transform;
            return true;
        }
        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push(PoseEntry {
            name: key.to_string(),
            transform,
        });
        false
    }

    /// Look up an entry by object name. The name is normalized first.
    pub fn get(&self, name: &str) -> Option<&PoseEntry> {
        self.index.get(normalize(name)).map(|&i| &self.entries[i])
    }

    /// Entry at `position` in insertion order.
    pub fn get_index(&self, position: usize) -> Option<&PoseEntry> {
        self.entries.get(position)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(normalize(name))
    }

    pub fn entries(&self) -> &[PoseEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoseEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode a pose. JSON has no NaN or infinity, so an entry with a
    /// non-finite value is rejected rather than written as `null`.
    pub fn to_json(&self) -> Result<String, PoseError> {
        self.check_finite()?;
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, PoseError> {
        self.check_finite()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn check_finite(&self) -> Result<(), PoseError> {
        match self.entries.iter().find(|e| !e.transform.is_finite()) {
            Some(entry) => Err(PoseError::NonFiniteTransform(entry.name.clone())),
            None => Ok(()),
        }
    }

    /// Decode a pose. Fails on malformed data and on a pose with no entries.
    pub fn from_json(s: &str) -> Result<Pose, PoseError> {
        Self::from_slice(s.as_bytes())
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Pose, PoseError> {
        let pose: Pose =
            serde_json::from_slice(bytes).map_err(|e| PoseError::CorruptPose(e.to_string()))?;
        if pose.is_empty() {
            return Err(PoseError::EmptyPose);
        }
        Ok(pose)
    }
}

/// Build a pose from `(name, transform)` pairs with the same duplicate
/// handling as [`Pose::capture`].
impl<N: AsRef<str>> FromIterator<(N, Transform)> for Pose {
    fn from_iter<I: IntoIterator<Item = (N, Transform)>>(iter: I) -> Self {
        let mut pose = Pose::new();
        for (name, transform) in iter {
            pose.insert(name.as_ref(), transform);
        }
        pose
    }
}

impl<'a> IntoIterator for &'a Pose {
    type Item = &'a PoseEntry;
    type IntoIter = std::slice::Iter<'a, PoseEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for Pose {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.transform.to_row_major())?;
        }
        map.end()
    }
}

/// Accepted per-entry encodings. Older pose files wrap the matrix in an
/// object with a `matrix` field.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredMatrix {
    Flat([f64; 16]),
    Wrapped { matrix: [f64; 16] },
}

impl StoredMatrix {
    fn into_transform(self) -> Transform {
        match self {
            StoredMatrix::Flat(values) | StoredMatrix::Wrapped { matrix: values } => {
                Transform::from_row_major(&values)
            }
        }
    }
}

struct PoseVisitor;

impl<'de> Visitor<'de> for PoseVisitor {
    type Value = Pose;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from object name to a 16-element matrix")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Pose, A::Error> {
        let mut pose = Pose::new();
        while let Some((name, matrix)) = map.next_entry::<String, StoredMatrix>()? {
            pose.insert(&name, matrix.into_transform());
        }
        Ok(pose)
    }
}

impl<'de> Deserialize<'de> for Pose {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Pose, D::Error> {
        deserializer.deserialize_map(PoseVisitor)
    }
}
