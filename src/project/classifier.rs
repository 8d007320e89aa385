//! Core trait and types for project root classification.

use std::path::Path;

/// Directories that together mark a Unity project root.
pub const UNITY_MARKERS: [&str; 4] = ["Assets", "ProjectSettings", "Packages", "UserSettings"];

/// Trait for project root classifiers.
///
/// A classifier decides, from the directory alone, whether the scanner should
/// treat it as a project root. It never recurses and never reports errors: a
/// marker that cannot be checked counts as missing.
pub trait ProjectClassifier: Send + Sync {
    /// Unique identifier for this project type (e.g., "unity").
    fn id(&self) -> &'static str;

    /// Subdirectories that must all exist directly under a project root.
    fn markers(&self) -> &'static [&'static str];

    /// Check if `path` is a project root.
    ///
    /// Default implementation requires every marker to be a directory.
    fn is_project_root(&self, path: &Path) -> bool {
        self.markers().iter().all(|m| path.join(m).is_dir())
    }
}

/// Classifier for Unity editor projects.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnityClassifier;

impl ProjectClassifier for UnityClassifier {
    fn id(&self) -> &'static str {
        "unity"
    }

    fn markers(&self) -> &'static [&'static str] {
        &UNITY_MARKERS
    }
}

/// Check if `path` is a Unity project root.
pub fn is_project_root(path: &Path) -> bool {
    UnityClassifier.is_project_root(path)
}
