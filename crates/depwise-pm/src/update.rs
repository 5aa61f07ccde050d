//! Manifest write-back through a temporary file.

use crate::Result;
use depwise_fs::FileSystem;
use std::path::{Path, PathBuf};

/// Writes files by writing a sibling temp file and renaming it into place.
///
/// This keeps a reader from ever seeing a half-written manifest. It does not
/// lock the file: an external edit between our read and our rename is lost.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileUpdater;

impl FileUpdater {
    /// `package.json` becomes `package.json.tmp`.
    pub fn temp_path(path: &Path) -> PathBuf {
        path.with_extension(format!(
            "{}.tmp",
            path.extension().and_then(|ext| ext.to_str()).unwrap_or("")
        ))
    }

    /// Replace the contents of `path`.
    ///
    /// # Errors
    /// Returns an error if the temp file cannot be written or renamed
    pub async fn update_file(
        &self,
        fs: &dyn FileSystem,
        path: &Path,
        new_contents: &str,
    ) -> Result<()> {
        let temp_path = Self::temp_path(path);
        fs.write(&temp_path, new_contents).await?;

        if let Err(err) = fs.rename(&temp_path, path).await {
            let _ = fs.remove_file(&temp_path).await;
            return Err(err.into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depwise_fs::{MemoryFileSystem, NativeFileSystem};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_update_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("package.json");
        let fs = NativeFileSystem::new(temp_dir.path()).unwrap();

        std::fs::write(&file_path, "{}").unwrap();

        FileUpdater
            .update_file(&fs, &file_path, "{\n  \"name\": \"app\"\n}\n")
            .await
            .unwrap();

        let content = std::fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "{\n  \"name\": \"app\"\n}\n");
        assert!(!temp_dir.path().join("package.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_update_file_in_memory() {
        let fs = MemoryFileSystem::new("/app").with_file("package.json", "old");

        FileUpdater
            .update_file(&fs, Path::new("/app/package.json"), "new")
            .await
            .unwrap();

        assert_eq!(fs.contents("package.json").as_deref(), Some("new"));
        assert_eq!(fs.len(), 1);
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            FileUpdater::temp_path(Path::new("/app/package.json")),
            PathBuf::from("/app/package.json.tmp")
        );
    }
}
