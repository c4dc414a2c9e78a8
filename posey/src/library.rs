/// Pose files on disk: single files and a directory of named poses.
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::PoseError;
use crate::pose::Pose;

const POSE_EXTENSION: &str = "json";

fn io_error(path: &Path, source: std::io::Error) -> PoseError {
    PoseError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read and decode a pose file.
pub fn read_pose(path: &Path) -> Result<Pose, PoseError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(PoseError::MissingPoseFile(path.to_path_buf()))
        }
        Err(e) => return Err(io_error(path, e)),
    };
    let pose = Pose::from_slice(&bytes)?;
    tracing::debug!("loaded {} entries from {}", pose.len(), path.display());
    Ok(pose)
}

/// Encode and write a pose, creating parent directories as needed.
pub fn write_pose(path: &Path, pose: &Pose) -> Result<(), PoseError> {
    if pose.is_empty() {
        return Err(PoseError::EmptyPose);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let json = pose.to_json()?;
    fs::write(path, json).map_err(|e| io_error(path, e))?;
    tracing::debug!("wrote {} entries to {}", pose.len(), path.display());
    Ok(())
}

/// A directory of named poses, one `<name>.json` file each.
#[derive(Debug, Clone)]
pub struct PoseLibrary {
    dir: PathBuf,
}

impl PoseLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a pose name.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, PoseError> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.{POSE_EXTENSION}")))
    }

    pub fn save(&self, name: &str, pose: &Pose) -> Result<PathBuf, PoseError> {
        let path = self.path_for(name)?;
        write_pose(&path, pose)?;
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<Pose, PoseError> {
        read_pose(&self.path_for(name)?)
    }

    pub fn remove(&self, name: &str) -> Result<(), PoseError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(PoseError::MissingPoseFile(path)),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    /// Names of stored poses, sorted. A missing directory is an empty library.
    pub fn list(&self) -> Result<Vec<String>, PoseError> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.dir, e)),
        };

        let mut names = Vec::new();
        for entry in read_dir {
            let path = entry.map_err(|e| io_error(&self.dir, e))?.path();
            let is_pose = path.extension().and_then(|e| e.to_str()) == Some(POSE_EXTENSION);
            if !path.is_file() || !is_pose {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

fn validate_name(name: &str) -> Result<(), PoseError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if invalid {
        return Err(PoseError::InvalidPoseName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Transform;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("posey-library-{}-{tag}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn sample_pose() -> Pose {
        let mut pose = Pose::new();
        pose.insert("hip", Transform::from_translation(0.0, 1.0, 0.0));
        pose.insert("hand", Transform::from_rotation_z(0.5));
        pose
    }

    #[test]
    fn write_then_read() {
        let dir = scratch_dir("rw");
        let path = dir.join("nested").join("Clipboard.json");
        write_pose(&path, &sample_pose()).unwrap();
        let back = read_pose(&path).unwrap();
        assert_eq!(back.names().collect::<Vec<_>>(), ["hip", "hand"]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn read_missing_file() {
        let dir = scratch_dir("missing");
        let err = read_pose(&dir.join("nope.json")).unwrap_err();
        assert!(matches!(err, PoseError::MissingPoseFile(_)));
    }

    #[test]
    fn read_empty_file_is_corrupt() {
        let dir = scratch_dir("empty");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Clipboard.json");
        fs::write(&path, "").unwrap();
        assert!(matches!(read_pose(&path), Err(PoseError::CorruptPose(_))));
        fs::write(&path, "{}").unwrap();
        assert!(matches!(read_pose(&path), Err(PoseError::EmptyPose)));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn non_finite_pose_writes_no_file() {
        let dir = scratch_dir("nan");
        let path = dir.join("Clipboard.json");
        let mut broken = Transform::IDENTITY;
        broken.data[0][0] = f64::NAN;
        let pose: Pose = [("hip", broken)].into_iter().collect();

        let err = write_pose(&path, &pose).unwrap_err();
        assert!(matches!(err, PoseError::NonFiniteTransform(_)));
        assert!(!path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn library_save_list_load_remove() {
        let dir = scratch_dir("lib");
        let library = PoseLibrary::new(&dir);
        assert!(library.list().unwrap().is_empty());

        library.save("wave", &sample_pose()).unwrap();
        library.save("crouch", &sample_pose()).unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        assert_eq!(library.list().unwrap(), ["crouch", "wave"]);

        let pose = library.load("wave").unwrap();
        assert_eq!(pose.len(), 2);

        library.remove("wave").unwrap();
        assert_eq!(library.list().unwrap(), ["crouch"]);
        assert!(matches!(
            library.remove("wave"),
            Err(PoseError::MissingPoseFile(_))
        ));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn library_rejects_bad_names() {
        let library = PoseLibrary::new("poses");
        for bad in ["", "../escape", "a/b", "a\\b", ".hidden"] {
            assert!(
                matches!(library.path_for(bad), Err(PoseError::InvalidPoseName(_))),
                "{bad:?}"
            );
        }
        assert_eq!(
            library.path_for("wave").unwrap(),
            Path::new("poses").join("wave.json")
        );
    }
}
