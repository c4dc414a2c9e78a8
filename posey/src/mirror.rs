use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PoseError;

/// World axis to mirror a pasted pose across.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MirrorAxis {
    #[default]
    None,
    X,
    Y,
    Z,
}

impl MirrorAxis {
    pub fn all() -> &'static [MirrorAxis] {
        &[MirrorAxis::None, MirrorAxis::X, MirrorAxis::Y, MirrorAxis::Z]
    }

    pub fn name(&self) -> &'static str {
        match self {
            MirrorAxis::None => "none",
            MirrorAxis::X => "x",
            MirrorAxis::Y => "y",
            MirrorAxis::Z => "z",
        }
    }

    /// Diagonal index negated by the reflection matrix for this axis.
    pub fn index(&self) -> Option<usize> {
        match self {
            MirrorAxis::None => None,
            MirrorAxis::X => Some(0),
            MirrorAxis::Y => Some(1),
            MirrorAxis::Z => Some(2),
        }
    }

    pub fn is_mirrored(&self) -> bool {
        *self != MirrorAxis::None
    }
}

impl FromStr for MirrorAxis {
    type Err = PoseError;

    /// Accepts `x`, `y`, `z` or `none` in any case; an empty string means no
    /// mirroring.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(MirrorAxis::None);
        }
        MirrorAxis::all()
            .iter()
            .find(|axis| axis.name().eq_ignore_ascii_case(trimmed))
            .copied()
            .ok_or_else(|| PoseError::InvalidMirrorAxis(s.to_string()))
    }
}

impl TryFrom<String> for MirrorAxis {
    type Error = PoseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MirrorAxis> for String {
    fn from(axis: MirrorAxis) -> Self {
        axis.name().to_string()
    }
}

impl fmt::Display for MirrorAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
