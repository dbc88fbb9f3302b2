//! Storage abstraction module.
//!
//! The core never touches a disk directly: every read, write, listing and move
//! goes through the [`Storage`] trait, so the same references work against a
//! local directory, an in-memory store, or a serialized JSON blob.
//!
//! ## Absence vs. failure
//!
//! [`Storage::read_file`] returns `Ok(None)` when the file does not exist and
//! `Err` only for an actual I/O failure. The reference layer depends on this
//! distinction (a missing index is synthesized, a failing one is reported).
//!
//! ## Object safety
//!
//! `Storage` is designed to be object-safe so it can be shared as
//! `Arc<dyn Storage>` by every reference. All async methods return boxed futures.

mod json;
#[cfg(not(target_arch = "wasm32"))]
mod local;
mod memory;

pub use json::JsonStorage;
#[cfg(not(target_arch = "wasm32"))]
pub use local::LocalStorage;
pub use memory::InMemoryStorage;

use std::future::Future;
use std::io::Result;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use chrono::{DateTime, Utc};

#[cfg(test)]
pub(crate) fn block_on_test<F: Future>(f: F) -> F::Output {
    futures_lite::future::block_on(f)
}

/// A boxed future for object-safe async methods.
///
/// Futures are `Send` for compatibility with multi-threaded runtimes.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Async abstraction over a document store.
///
/// Paths are backend-relative; use [`Storage::resolve`] to obtain the
/// backend-absolute form.
///
/// # Example
///
/// ```ignore
/// use folio_core::storage::{InMemoryStorage, Storage};
///
/// async fn example(storage: &dyn Storage) {
///     let content = storage.read_file(Path::new("docs/index.md")).await.unwrap();
///     storage.write_file(Path::new("docs/copy.md"), &content.unwrap()).await.unwrap();
/// }
/// ```
pub trait Storage: Send + Sync {
    // ==================== Read side ====================

    /// Reads a file as text. `Ok(None)` means the file does not exist.
    fn read_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Option<String>>>;

    /// Lists the names of the immediate children of a directory.
    fn read_directory_file_names<'a>(&'a self, path: &'a Path)
    -> BoxFuture<'a, Result<Vec<String>>>;

    /// Lists the backend-relative paths of the immediate children of a directory.
    fn read_directory_file_paths<'a>(
        &'a self,
        path: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<PathBuf>>> {
        Box::pin(async move {
            let names = self.read_directory_file_names(path).await?;
            Ok(names.into_iter().map(|name| path.join(name)).collect())
        })
    }

    /// Checks if a path is a file.
    fn is_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool>;

    /// Checks if a path is a directory.
    fn is_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool>;

    /// Checks if a file or directory exists.
    fn exists<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool> {
        Box::pin(async move { self.is_file(path).await || self.is_directory(path).await })
    }

    /// Size of a file in bytes.
    fn file_size<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<u64>>;

    /// Last modification time of a file.
    fn file_updated_time<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<DateTime<Utc>>>;

    /// Creation time of a file.
    fn file_created_time<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<DateTime<Utc>>>;

    /// The backend-absolute root every relative path is resolved against.
    fn base_path(&self) -> &Path;

    /// Resolves a backend-relative path to its backend-absolute form.
    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_path().join(path)
    }

    // ==================== Write side ====================

    /// Writes a file, creating parent directories as needed.
    fn write_file<'a>(&'a self, path: &'a Path, content: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Deletes a file.
    fn delete_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>>;

    /// Copies a file from `from` to `to`.
    fn copy_file<'a>(&'a self, from: &'a Path, to: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let content = self.read_file(from).await?.ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Source file not found: {:?}", from),
                )
            })?;
            self.write_file(to, &content).await
        })
    }

    /// Moves a file from `from` to `to`.
    ///
    /// The default is copy-then-delete and is not atomic: if the delete fails
    /// after a successful copy, the file exists at both locations.
    fn move_file<'a>(&'a self, from: &'a Path, to: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.copy_file(from, to).await?;
            self.delete_file(from).await
        })
    }

    /// Creates a directory and all parent directories.
    fn create_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>>;

    /// Creates a single empty directory; fails if it already exists.
    fn create_empty_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>>;
}

/// Normalize a backend-relative path by resolving `.` and `..` components
/// without touching the backend. Leading `..` that cannot be resolved are dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                components.pop();
            }
            c => components.push(c),
        }
    }
    components.iter().collect()
}
