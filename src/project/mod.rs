//! Project discovery primitives.
//!
//! This module provides:
//! - Classification of directories as Unity project roots
//! - The ordered store of discovered projects and their dispositions

mod classifier;
mod record;

pub use classifier::{is_project_root, ProjectClassifier, UnityClassifier, UNITY_MARKERS};
pub use record::{Disposition, DispositionCounts, DispositionStore, ProjectRecord};
