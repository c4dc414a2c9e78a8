/// Pose transfer: map a saved pose onto a live selection.
///
/// For each selected object the matching saved transform `M` is found (by
/// normalized name or by selection position) and turned into a new world
/// transform:
///
/// - no reference: `M`, or `M * reflect` when mirroring;
/// - reference `R`: `M * inverse(R_saved)`, optionally `* reflect`, then
///   `* R_current`. The pose is re-expressed relative to where `R` is now.
///
/// Products keep the saved transform on the left. Nothing is written to the
/// host here; the caller applies the returned transforms.
use crate::error::PoseError;
use crate::host::HostAdapter;
use crate::matrix::Transform;
use crate::mirror::MirrorAxis;
use crate::pose::Pose;

/// How a saved pose is matched and re-based onto the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PasteOptions {
    /// Match by normalized name; otherwise by selection position.
    pub by_name: bool,
    /// Live object whose saved-vs-current transform re-bases the pose.
    pub reference: Option<String>,
    pub mirror: MirrorAxis,
}

impl Default for PasteOptions {
    fn default() -> Self {
        Self {
            by_name: true,
            reference: None,
            mirror: MirrorAxis::None,
        }
    }
}

impl PasteOptions {
    /// Build options from raw caller input. An empty reference means none.
    pub fn parse(by_name: bool, reference: Option<&str>, mirror: &str) -> Result<Self, PoseError> {
        let mirror = mirror.parse::<MirrorAxis>()?;
        let reference = reference
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        Ok(Self {
            by_name,
            reference,
            mirror,
        })
    }
}

/// A pending write of `transform` to the live `object`.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub object: String,
    /// Name of the pose entry the transform came from.
    pub source: String,
    pub transform: Transform,
}

/// Result of a transfer: writes to perform and objects left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transfer {
    pub applications: Vec<Application>,
    /// Selected objects with no matching pose entry.
    pub skipped: Vec<String>,
}

impl Transfer {
    pub fn applied_count(&self) -> usize {
        self.applications.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Saved and current reference transforms, resolved once before the loop.
struct Rebase {
    saved_inverse: Transform,
    current: Transform,
}

fn resolve_reference<H: HostAdapter + ?Sized>(
    host: &H,
    pose: &Pose,
    reference: &str,
) -> Result<Rebase, PoseError> {
    if !host.object_exists(reference) {
        return Err(PoseError::ReferenceNotFound(reference.to_string()));
    }
    let saved = pose
        .get(reference)
        .ok_or_else(|| PoseError::ReferenceNotInPose(reference.to_string()))?;
    let current = host.world_transform(reference)?;
    let saved_inverse = saved
        .transform
        .inverse()
        .ok_or_else(|| PoseError::SingularMatrix(reference.to_string()))?;
    Ok(Rebase {
        saved_inverse,
        current,
    })
}

/// Compute new world transforms for `selection` from `pose`.
///
/// Fails before producing anything if the reference object is missing from
/// the scene or the pose, or if its saved transform cannot be inverted.
/// Unmatched objects are skipped and reported, not treated as errors.
pub fn transfer<H, S>(
    host: &H,
    selection: &[S],
    pose: &Pose,
    options: &PasteOptions,
) -> Result<Transfer, PoseError>
where
    H: HostAdapter + ?Sized,
    S: AsRef<str>,
{
    let reference = options.reference.as_deref();
    let rebase = reference
        .map(|r| resolve_reference(host, pose, r))
        .transpose()?;
    let reflection = Transform::reflection(options.mirror);
    let mirrored = options.mirror.is_mirrored();

    let mut result = Transfer::default();
    for (position, object) in selection.iter().enumerate() {
        let object = object.as_ref();

        // The reference stays where it is
        if reference == Some(object) {
            continue;
        }

        let entry = if options.by_name {
            pose.get(object)
        } else {
            pose.get_index(position)
        };
        let Some(entry) = entry else {
            tracing::warn!("no saved pose found for {}, skipping", object);
            result.skipped.push(object.to_string());
            continue;
        };

        let saved = entry.transform;
        let transform = match &rebase {
            Some(rebase) => {
                let mut offset = saved * rebase.saved_inverse;
                if mirrored {
                    offset = offset * reflection;
                }
                offset * rebase.current
            }
            None if mirrored => saved * reflection,
            None => saved,
        };

        result.applications.push(Application {
            object: object.to_string(),
            source: entry.name.clone(),
            transform,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SceneHost;

    fn t(x: f64, y: f64, z: f64) -> Transform {
        Transform::from_translation(x, y, z)
    }

    fn pose_of(entries: &[(&str, Transform)]) -> Pose {
        let mut pose = Pose::new();
        for (name, transform) in entries {
            pose.insert(name, *transform);
        }
        pose
    }

    fn by_name() -> PasteOptions {
        PasteOptions::default()
    }

    #[test]
    fn parse_options() {
        let opts = PasteOptions::parse(false, Some(" rig:hip "), "X").unwrap();
        assert!(!opts.by_name);
        assert_eq!(opts.reference.as_deref(), Some("rig:hip"));
        assert_eq!(opts.mirror, MirrorAxis::X);

        let opts = PasteOptions::parse(true, Some(""), "").unwrap();
        assert_eq!(opts.reference, None);
        assert_eq!(opts.mirror, MirrorAxis::None);
    }

    #[test]
    fn parse_options_rejects_bad_mirror() {
        let err = PasteOptions::parse(true, None, "w").unwrap_err();
        assert!(matches!(err, PoseError::InvalidMirrorAxis(_)));
    }

    #[test]
    fn same_selection_reproduces_pose_exactly() {
        let a = Transform::from_rotation_z(0.3) * t(1.0, 2.0, 3.0);
        let b = Transform::from_scale(1.0, 2.0, 1.0) * t(-4.0, 0.5, 0.0);
        let pose = pose_of(&[("ns:a", a), ("ns:b", b)]);
        let host = SceneHost::new();

        let result = transfer(&host, &["ns:a", "ns:b"], &pose, &by_name()).unwrap();
        assert_eq!(result.skipped_count(), 0);
        assert_eq!(result.applications[0].transform, a);
        assert_eq!(result.applications[1].transform, b);
    }

    #[test]
    fn by_name_matches_across_namespaces() {
        let pose = pose_of(&[("old:hand", t(1.0, 0.0, 0.0))]);
        let host = SceneHost::new();
        let result = transfer(&host, &["new:hand"], &pose, &by_name()).unwrap();
        assert_eq!(result.applications.len(), 1);
        assert_eq!(result.applications[0].object, "new:hand");
        assert_eq!(result.applications[0].source, "hand");
    }

    #[test]
    fn by_name_skips_unmatched_objects() {
        let pose = pose_of(&[("a", t(1.0, 0.0, 0.0))]);
        let host = SceneHost::new();
        let result = transfer(&host, &["b", "a", "c"], &pose, &by_name()).unwrap();
        assert_eq!(result.applied_count(), 1);
        assert_eq!(result.skipped, ["b", "c"]);
    }

    #[test]
    fn by_order_applies_positionally_and_skips_extras() {
        let pose = pose_of(&[
            ("a", t(1.0, 0.0, 0.0)),
            ("b", t(2.0, 0.0, 0.0)),
            ("c", t(3.0, 0.0, 0.0)),
        ]);
        let host = SceneHost::new();
        let opts = PasteOptions {
            by_name: false,
            ..PasteOptions::default()
        };
        let selection = ["v", "w", "x", "y", "z"];
        let result = transfer(&host, &selection, &pose, &opts).unwrap();

        assert_eq!(result.applied_count(), 3);
        assert_eq!(result.skipped_count(), 2);
        assert_eq!(result.skipped, ["y", "z"]);
        for (i, app) in result.applications.iter().enumerate() {
            assert_eq!(app.object, selection[i]);
            assert_eq!(app.transform.translation(), [(i + 1) as f64, 0.0, 0.0]);
        }
    }

    #[test]
    fn by_order_ignores_names() {
        let pose = pose_of(&[("x", t(1.0, 0.0, 0.0)), ("y", t(2.0, 0.0, 0.0))]);
        let host = SceneHost::new();
        let opts = PasteOptions {
            by_name: false,
            ..PasteOptions::default()
        };
        let result = transfer(&host, &["y", "x"], &pose, &opts).unwrap();
        assert_eq!(result.applications[0].object, "y");
        assert_eq!(result.applications[0].source, "x");
        assert_eq!(result.applications[0].transform.translation(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn mirror_without_reference() {
        let pose = pose_of(&[("a", t(3.0, 4.0, 5.0))]);
        let host = SceneHost::new();
        let opts = PasteOptions {
            mirror: MirrorAxis::X,
            ..PasteOptions::default()
        };
        let result = transfer(&host, &["a"], &pose, &opts).unwrap();
        assert_eq!(result.applications[0].transform.translation(), [-3.0, 4.0, 5.0]);
    }

    #[test]
    fn reference_relative_replay() {
        let mr = Transform::from_rotation_z(0.4) * t(1.0, 0.0, 0.0);
        let mo = Transform::from_rotation_y(-0.2) * t(2.0, 1.0, 0.5);
        let mr2 = Transform::from_rotation_z(1.1) * t(-3.0, 2.0, 0.0);
        let pose = pose_of(&[("hip", mr), ("hand", mo)]);

        let mut host = SceneHost::new()
            .with_object("hip", mr2)
            .with_object("hand", mo);
        host.select(["hip", "hand"]);

        let opts = PasteOptions {
            reference: Some("hip".into()),
            ..PasteOptions::default()
        };
        let result = transfer(&host, &["hip", "hand"], &pose, &opts).unwrap();

        // The reference itself is not repositioned
        assert_eq!(result.applied_count(), 1);
        assert_eq!(result.skipped_count(), 0);
        let app = &result.applications[0];
        assert_eq!(app.object, "hand");
        let expected = (mo * mr.inverse().unwrap()) * mr2;
        assert!(app.transform.approx_eq(&expected, 1e-12));
    }

    #[test]
    fn reference_translation_follows() {
        let pose = pose_of(&[("hip", t(1.0, 0.0, 0.0)), ("hand", t(3.0, 0.0, 0.0))]);
        let host = SceneHost::new().with_object("hip", t(5.0, 0.0, 0.0));
        let opts = PasteOptions {
            reference: Some("hip".into()),
            ..PasteOptions::default()
        };
        let result = transfer(&host, &["hand"], &pose, &opts).unwrap();
        assert!(result.applications[0]
            .transform
            .approx_eq(&t(7.0, 0.0, 0.0), 1e-12));
    }

    #[test]
    fn reference_with_mirror_reflects_offset() {
        let pose = pose_of(&[("hip", t(1.0, 0.0, 0.0)), ("hand", t(3.0, 2.0, 0.0))]);
        let host = SceneHost::new().with_object("hip", t(10.0, 0.0, 0.0));
        let opts = PasteOptions {
            reference: Some("hip".into()),
            mirror: MirrorAxis::X,
            ..PasteOptions::default()
        };
        let result = transfer(&host, &["hand"], &pose, &opts).unwrap();
        // offset (2, 2, 0) mirrored to (-2, 2, 0), then moved onto the hip
        let expected = Transform::reflection(MirrorAxis::X) * t(8.0, 2.0, 0.0);
        assert!(result.applications[0].transform.approx_eq(&expected, 1e-12));
    }

    #[test]
    fn reference_matched_by_normalized_name_in_pose() {
        let pose = pose_of(&[("old:hip", t(1.0, 0.0, 0.0)), ("old:hand", t(2.0, 0.0, 0.0))]);
        let host = SceneHost::new().with_object("new:hip", t(1.0, 1.0, 0.0));
        let opts = PasteOptions {
            reference: Some("new:hip".into()),
            ..PasteOptions::default()
        };
        let result = transfer(&host, &["new:hip", "new:hand"], &pose, &opts).unwrap();
        assert_eq!(result.applied_count(), 1);
        assert!(result.applications[0]
            .transform
            .approx_eq(&t(2.0, 1.0, 0.0), 1e-12));
    }

    #[test]
    fn missing_reference_in_scene() {
        let pose = pose_of(&[("hip", t(1.0, 0.0, 0.0)), ("hand", t(2.0, 0.0, 0.0))]);
        let host = SceneHost::new().with_object("hand", Transform::IDENTITY);
        let opts = PasteOptions {
            reference: Some("hip".into()),
            ..PasteOptions::default()
        };
        let err = transfer(&host, &["hand"], &pose, &opts).unwrap_err();
        assert!(matches!(err, PoseError::ReferenceNotFound(ref r) if r == "hip"));
    }

    #[test]
    fn missing_reference_in_pose() {
        let pose = pose_of(&[("hand", t(2.0, 0.0, 0.0))]);
        let host = SceneHost::new().with_object("hip", Transform::IDENTITY);
        let opts = PasteOptions {
            reference: Some("hip".into()),
            ..PasteOptions::default()
        };
        let err = transfer(&host, &["hand"], &pose, &opts).unwrap_err();
        assert!(matches!(err, PoseError::ReferenceNotInPose(_)));
    }

    #[test]
    fn singular_reference_aborts() {
        let pose = pose_of(&[
            ("hip", Transform::from_scale(0.0, 1.0, 1.0)),
            ("hand", t(2.0, 0.0, 0.0)),
        ]);
        let host = SceneHost::new().with_object("hip", Transform::IDENTITY);
        let opts = PasteOptions {
            reference: Some("hip".into()),
            ..PasteOptions::default()
        };
        let err = transfer(&host, &["hand"], &pose, &opts).unwrap_err();
        assert!(matches!(err, PoseError::SingularMatrix(_)));
    }

    #[test]
    fn empty_selection_yields_nothing() {
        let pose = pose_of(&[("a", Transform::IDENTITY)]);
        let selection: [&str; 0] = [];
        let result = transfer(&SceneHost::new(), &selection, &pose, &by_name()).unwrap();
        assert_eq!(result, Transfer::default());
    }
}
