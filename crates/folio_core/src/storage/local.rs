//! Local disk storage.
//!
//! Only available on non-WASM targets.

use std::fs;
use std::io::{ErrorKind, Result};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::{BoxFuture, Storage};

/// Storage rooted at a directory on the local disk, mapping to `std::fs`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base: PathBuf,
}

impl LocalStorage {
    /// Create a storage rooted at `base`. Relative paths are resolved against it.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn full(&self, path: &Path) -> PathBuf {
        self.base.join(path)
    }
}

impl Storage for LocalStorage {
    fn read_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Option<String>>> {
        Box::pin(async move {
            match fs::read_to_string(self.full(path)) {
                Ok(content) => Ok(Some(content)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e),
            }
        })
    }

    fn read_directory_file_names<'a>(
        &'a self,
        path: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move {
            let mut names = Vec::new();
            for entry in fs::read_dir(self.full(path))? {
                let entry = entry?;
                names.push(entry.file_name().to_string_lossy().to_string());
            }
            names.sort();
            Ok(names)
        })
    }

    fn is_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool> {
        Box::pin(async move { self.full(path).is_file() })
    }

    fn is_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool> {
        Box::pin(async move { self.full(path).is_dir() })
    }

    fn exists<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool> {
        Box::pin(async move { self.full(path).exists() })
    }

    fn file_size<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<u64>> {
        Box::pin(async move { Ok(fs::metadata(self.full(path))?.len()) })
    }

    fn file_updated_time<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<DateTime<Utc>>> {
        Box::pin(async move {
            let modified = fs::metadata(self.full(path))?.modified()?;
            Ok(DateTime::<Utc>::from(modified))
        })
    }

    fn file_created_time<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<DateTime<Utc>>> {
        Box::pin(async move {
            let metadata = fs::metadata(self.full(path))?;
            // Not every filesystem records a birth time
            let created = metadata.created().or_else(|_| metadata.modified())?;
            Ok(DateTime::<Utc>::from(created))
        })
    }

    fn base_path(&self) -> &Path {
        &self.base
    }

    fn write_file<'a>(&'a self, path: &'a Path, content: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let full = self.full(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full, content)
        })
    }

    fn delete_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { fs::remove_file(self.full(path)) })
    }

    fn copy_file<'a>(&'a self, from: &'a Path, to: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let to = self.full(to);
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(self.full(from), to).map(|_| ())
        })
    }

    fn move_file<'a>(&'a self, from: &'a Path, to: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let from = self.full(from);
            let to = self.full(to);
            if !from.exists() {
                return Err(std::io::Error::new(
                    ErrorKind::NotFound,
                    format!("Source file not found: {:?}", from),
                ));
            }
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(from, to)
        })
    }

    fn create_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { fs::create_dir_all(self.full(path)) })
    }

    fn create_empty_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { fs::create_dir(self.full(path)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on_test;

    #[test]
    fn test_local_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        block_on_test(storage.write_file(Path::new("docs/guide/a.md"), "# A")).unwrap();
        assert_eq!(
            block_on_test(storage.read_file(Path::new("docs/guide/a.md"))).unwrap(),
            Some("# A".to_string())
        );
        assert!(block_on_test(storage.is_directory(Path::new("docs/guide"))));
        assert_eq!(
            block_on_test(storage.read_directory_file_names(Path::new("docs"))).unwrap(),
            vec!["guide"]
        );
        assert_eq!(
            block_on_test(storage.file_size(Path::new("docs/guide/a.md"))).unwrap(),
            3
        );
    }

    #[test]
    fn test_local_storage_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert_eq!(
            block_on_test(storage.read_file(Path::new("missing.md"))).unwrap(),
            None
        );
        assert!(block_on_test(storage.read_directory_file_names(Path::new("missing"))).is_err());
    }

    #[test]
    fn test_local_storage_move_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        block_on_test(storage.write_file(Path::new("docs/a.md"), "x")).unwrap();

        block_on_test(storage.move_file(Path::new("docs/a.md"), Path::new("docs/_/a.md")))
            .unwrap();

        assert!(!block_on_test(storage.exists(Path::new("docs/a.md"))));
        assert!(block_on_test(storage.is_file(Path::new("docs/_/a.md"))));
        assert_eq!(
            storage.resolve(Path::new("docs/_/a.md")),
            dir.path().join("docs/_/a.md")
        );
    }
}
