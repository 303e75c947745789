//! Disk-image discovery and persona inference.

use crate::errors::{AppliteError, AppliteResult};
use crate::profile::ComponentKind;
use std::path::{Path, PathBuf};

/// Outcome of scanning the image directory.
#[derive(Debug, Clone)]
pub struct ClassifiedImage {
    /// Selected boot disk image.
    pub disk_image: PathBuf,

    /// Inferred or explicitly supplied persona, if any.
    pub kind: Option<ComponentKind>,
}

/// Scan `images_dir` for a bootable disk image and infer the persona.
///
/// Entries are sorted by name and the first one with a `.qcow2` suffix is
/// selected. When `explicit` is `None` the persona is inferred from
/// case-insensitive substrings of that file name ("manage" → manager,
/// "smart" → controller, "bond" → validator); no match leaves the kind
/// unset for the caller to default.
///
/// # Errors
///
/// Returns [`AppliteError::Classification`] when the directory holds no
/// disk image at all; image selection is mandatory for provisioning.
pub fn classify(
    images_dir: &Path,
    explicit: Option<ComponentKind>,
) -> AppliteResult<ClassifiedImage> {
    let mut names: Vec<String> = std::fs::read_dir(images_dir)
        .map_err(|e| {
            AppliteError::Classification(format!(
                "cannot scan image directory {}: {}",
                images_dir.display(),
                e
            ))
        })?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();

    let image_name = names
        .iter()
        .find(|name| name.ends_with(".qcow2"))
        .ok_or_else(|| {
            AppliteError::Classification(format!(
                "no qcow2 disk image found in {}",
                images_dir.display()
            ))
        })?;

    let kind = explicit.or_else(|| infer_kind(image_name));
    tracing::debug!(image = %image_name, kind = ?kind, "classified disk image");

    Ok(ClassifiedImage {
        disk_image: images_dir.join(image_name),
        kind,
    })
}

/// Infer a persona from substrings of the image file name.
fn infer_kind(image_name: &str) -> Option<ComponentKind> {
    let lower = image_name.to_lowercase();
    if lower.contains("manage") {
        Some(ComponentKind::Manager)
    } else if lower.contains("smart") {
        Some(ComponentKind::Controller)
    } else if lower.contains("bond") {
        Some(ComponentKind::Validator)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ComponentProfile;
    use std::fs::File;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_infer_manager() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "viptela-vmanage-20.9.1.qcow2");

        let classified = classify(dir.path(), None).unwrap();
        assert_eq!(classified.kind, Some(ComponentKind::Manager));

        let profile = ComponentProfile::resolve(classified.kind, classified.disk_image);
        assert_eq!(profile.ram_megabytes, 16384);
    }

    #[test]
    fn test_infer_controller_and_validator() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "viptela-smart-20.9.1.qcow2");
        assert_eq!(
            classify(dir.path(), None).unwrap().kind,
            Some(ComponentKind::Controller)
        );

        let dir = tempdir().unwrap();
        touch(dir.path(), "viptela-vbond-20.9.1.qcow2");
        let classified = classify(dir.path(), None).unwrap();
        assert_eq!(classified.kind, Some(ComponentKind::Validator));
        assert_eq!(
            ComponentProfile::resolve(classified.kind, classified.disk_image).ram_megabytes,
            2048
        );
    }

    #[test]
    fn test_no_match_leaves_kind_unset() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "appliance.qcow2");

        let classified = classify(dir.path(), None).unwrap();
        assert_eq!(classified.kind, None);
    }

    #[test]
    fn test_explicit_override_wins() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "viptela-vmanage-20.9.1.qcow2");

        let classified = classify(dir.path(), Some(ComponentKind::Validator)).unwrap();
        assert_eq!(classified.kind, Some(ComponentKind::Validator));
    }

    #[test]
    fn test_first_image_by_name_wins() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "b-smart.qcow2");
        touch(dir.path(), "a-bond.qcow2");
        touch(dir.path(), "notes.txt");

        let classified = classify(dir.path(), None).unwrap();
        assert_eq!(classified.disk_image, dir.path().join("a-bond.qcow2"));
        assert_eq!(classified.kind, Some(ComponentKind::Validator));
    }

    #[test]
    fn test_no_image_is_fatal() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "readme.md");

        let err = classify(dir.path(), None).unwrap_err();
        assert!(matches!(err, AppliteError::Classification(_)));
    }
}
