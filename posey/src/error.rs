use std::path::PathBuf;

use thiserror::Error;

use crate::host::HostError;

#[derive(Debug, Error)]
pub enum PoseError {
    #[error("nothing is selected")]
    EmptySelection,

    #[error("pose is empty; select some objects and copy the pose again")]
    EmptyPose,

    #[error("pose data is corrupt: {0}")]
    CorruptPose(String),

    #[error("no pose file at {}; copy a pose first", .0.display())]
    MissingPoseFile(PathBuf),

    #[error("invalid mirror axis '{0}' (expected x, y, z or none)")]
    InvalidMirrorAxis(String),

    #[error("reference object '{0}' does not exist in the scene")]
    ReferenceNotFound(String),

    #[error("reference object '{0}' is not in the saved pose; select it and copy the pose again")]
    ReferenceNotInPose(String),

    #[error("saved transform of '{0}' is not invertible")]
    SingularMatrix(String),

    #[error("invalid pose name '{0}'")]
    InvalidPoseName(String),

    #[error("transform of '{0}' has a NaN or infinite value")]
    NonFiniteTransform(String),

    #[error("encoding pose: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Host(#[from] HostError),
}

/// Coarse classification of a [`PoseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller-supplied data is insufficient or malformed.
    Input,
    /// Reference object setup failed.
    Reference,
    /// A required inverse could not be computed.
    Matrix,
    /// The pose file or library could not be read or written.
    Storage,
    /// The host binding refused a read or write.
    Host,
}

impl PoseError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PoseError::EmptySelection
            | PoseError::EmptyPose
            | PoseError::CorruptPose(_)
            | PoseError::InvalidMirrorAxis(_)
            | PoseError::InvalidPoseName(_) => ErrorCategory::Input,
            PoseError::ReferenceNotFound(_) | PoseError::ReferenceNotInPose(_) => {
                ErrorCategory::Reference
            }
            PoseError::SingularMatrix(_) | PoseError::NonFiniteTransform(_) => {
                ErrorCategory::Matrix
            }
            PoseError::MissingPoseFile(_) | PoseError::Io { .. } | PoseError::Encode(_) => {
                ErrorCategory::Storage
            }
            PoseError::Host(_) => ErrorCategory::Host,
        }
    }
}
