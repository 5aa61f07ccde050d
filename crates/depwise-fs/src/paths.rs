//! Path helpers shared by the filesystem implementations.

use std::path::{Component, Path, PathBuf};

/// Remove `.` and `..` components without touching the disk.
pub(crate) fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                result = PathBuf::from(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(name) => result.push(name),
        }
    }
    result
}
