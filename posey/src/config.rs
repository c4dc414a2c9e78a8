use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::host::HostKind;
use crate::library::PoseLibrary;
use crate::mirror::MirrorAxis;
use crate::transfer::PasteOptions;

pub const CLIPBOARD_FILE: &str = "Clipboard.json";
pub const LIBRARY_DIR: &str = "poses";

/// Tool configuration, usually read from `posey.toml`.
///
/// ```toml
/// data_dir = ".posey"
/// host = "scene-file"
/// scene = "scene.json"
///
/// [paste]
/// by_name = true
/// reference = "rig:hip"
/// mirror = "x"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoseyConfig {
    /// Root for the clipboard file and the pose library.
    pub data_dir: PathBuf,
    /// Overrides `<data_dir>/Clipboard.json`.
    pub clipboard: Option<PathBuf>,
    /// Overrides `<data_dir>/poses`.
    pub library_dir: Option<PathBuf>,
    pub host: HostKind,
    /// Scene file for the `scene-file` host.
    pub scene: Option<PathBuf>,
    pub paste: PasteDefaults,
}

impl Default for PoseyConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".posey"),
            clipboard: None,
            library_dir: None,
            host: HostKind::default(),
            scene: None,
            paste: PasteDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasteDefaults {
    pub by_name: bool,
    pub reference: Option<String>,
    pub mirror: MirrorAxis,
}

impl Default for PasteDefaults {
    fn default() -> Self {
        Self {
            by_name: true,
            reference: None,
            mirror: MirrorAxis::None,
        }
    }
}

impl From<&PasteDefaults> for PasteOptions {
    fn from(defaults: &PasteDefaults) -> Self {
        PasteOptions {
            by_name: defaults.by_name,
            reference: defaults.reference.clone().filter(|r| !r.is_empty()),
            mirror: defaults.mirror,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl PoseyConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// The implicit clipboard used when no pose file is named.
    pub fn clipboard_path(&self) -> PathBuf {
        self.clipboard
            .clone()
            .unwrap_or_else(|| self.data_dir.join(CLIPBOARD_FILE))
    }

    pub fn library_path(&self) -> PathBuf {
        self.library_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(LIBRARY_DIR))
    }

    /// The pose library rooted at [`library_path`](Self::library_path).
    pub fn library(&self) -> PoseLibrary {
        PoseLibrary::new(self.library_path())
    }

    pub fn paste_options(&self) -> PasteOptions {
        PasteOptions::from(&self.paste)
    }
}
