//! Storage backed by a serialized JSON blob.
//!
//! The blob is a single JSON object mapping backend-relative paths to file
//! contents: `{"docs/index.md": "---\nicon: 📚\n---\n", ...}`. It is loaded into
//! memory on construction and exported back with [`JsonStorage::to_json`].

use std::io::Result;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use super::{BoxFuture, InMemoryStorage, Storage};
use crate::error::Result as FolioResult;

/// A JSON-blob storage: an in-memory store that can be (de)serialized as one object.
#[derive(Debug, Clone, Default)]
pub struct JsonStorage {
    inner: InMemoryStorage,
}

impl JsonStorage {
    /// Load a storage from a JSON object blob.
    pub fn from_json(json: &str) -> FolioResult<Self> {
        let entries: IndexMap<String, String> = serde_json::from_str(json)?;
        log::debug!("Loaded JSON storage with {} files", entries.len());
        Ok(Self {
            inner: InMemoryStorage::with_files(entries),
        })
    }

    /// Serialize every file into a JSON object blob (keys sorted by path).
    pub fn to_json(&self) -> FolioResult<String> {
        let entries: IndexMap<String, String> = self.inner.export_entries().into_iter().collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }
}

impl Storage for JsonStorage {
    fn read_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Option<String>>> {
        self.inner.read_file(path)
    }

    fn read_directory_file_names<'a>(
        &'a self,
        path: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        self.inner.read_directory_file_names(path)
    }

    fn is_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool> {
        self.inner.is_file(path)
    }

    fn is_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool> {
        self.inner.is_directory(path)
    }

    fn file_size<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<u64>> {
        self.inner.file_size(path)
    }

    fn file_updated_time<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<DateTime<Utc>>> {
        self.inner.file_updated_time(path)
    }

    fn file_created_time<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<DateTime<Utc>>> {
        self.inner.file_created_time(path)
    }

    fn base_path(&self) -> &Path {
        self.inner.base_path()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.inner.resolve(path)
    }

    fn write_file<'a>(&'a self, path: &'a Path, content: &'a str) -> BoxFuture<'a, Result<()>> {
        self.inner.write_file(path, content)
    }

    fn delete_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        self.inner.delete_file(path)
    }

    fn create_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        self.inner.create_directory(path)
    }

    fn create_empty_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        self.inner.create_empty_directory(path)
    }
}
