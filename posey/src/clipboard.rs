use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::PoseyConfig;
use crate::error::PoseError;
use crate::host::HostAdapter;
use crate::library::{read_pose, write_pose, PoseLibrary};
use crate::pose::Pose;
use crate::transfer::{transfer, PasteOptions, Transfer};

/// Outcome of a paste.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PasteReport {
    /// Objects that received a new transform, in selection order.
    pub applied: Vec<String>,
    /// Selected objects with no saved pose.
    pub skipped: Vec<String>,
}

impl PasteReport {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Copy and paste poses between a host's selection and pose files.
pub struct PoseClipboard<H> {
    host: H,
    config: PoseyConfig,
}

impl<H: HostAdapter> PoseClipboard<H> {
    pub fn new(host: H, config: PoseyConfig) -> Self {
        Self { host, config }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn config(&self) -> &PoseyConfig {
        &self.config
    }

    pub fn library(&self) -> PoseLibrary {
        self.config.library()
    }

    fn resolve(&self, path: Option<&Path>) -> PathBuf {
        path.map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.clipboard_path())
    }

    /// Capture the current selection and write it to `target`, or to the
    /// clipboard file when `target` is `None`.
    pub fn copy(&self, target: Option<&Path>) -> Result<Pose, PoseError> {
        let selection = self.host.selection();
        let pose = Pose::capture(&selection, |object| self.host.world_transform(object))?;
        let path = self.resolve(target);
        write_pose(&path, &pose)?;
        tracing::info!("copied pose of {} objects to {}", pose.len(), path.display());
        Ok(pose)
    }

    /// Copy the current selection into the pose library under `name`.
    pub fn copy_to_library(&self, name: &str) -> Result<Pose, PoseError> {
        let path = self.library().path_for(name)?;
        self.copy(Some(&path))
    }

    /// Compute what a paste would do without touching the host.
    pub fn preview(
        &self,
        source: Option<&Path>,
        options: &PasteOptions,
    ) -> Result<Transfer, PoseError> {
        let selection = self.host.selection();
        if selection.is_empty() {
            return Err(PoseError::EmptySelection);
        }
        let pose = read_pose(&self.resolve(source))?;
        transfer(&self.host, &selection, &pose, options)
    }

    /// Paste the pose in `source` (or the clipboard) onto the selection.
    ///
    /// All validation happens before the first write. A host failure while
    /// writing stops the paste; earlier writes are not rolled back.
    pub fn paste(
        &mut self,
        source: Option<&Path>,
        options: &PasteOptions,
    ) -> Result<PasteReport, PoseError> {
        let transfer = self.preview(source, options)?;

        let mut report = PasteReport {
            applied: Vec::with_capacity(transfer.applied_count()),
            skipped: transfer.skipped,
        };
        for application in transfer.applications {
            self.host
                .set_world_transform(&application.object, &application.transform)?;
            report.applied.push(application.object);
        }

        tracing::info!(
            "pasted pose onto {} objects ({} skipped)",
            report.applied_count(),
            report.skipped_count()
        );
        Ok(report)
    }

    /// Paste a named pose from the library.
    pub fn paste_from_library(
        &mut self,
        name: &str,
        options: &PasteOptions,
    ) -> Result<PasteReport, PoseError> {
        let path = self.library().path_for(name)?;
        self.paste(Some(&path), options)
    }
}
