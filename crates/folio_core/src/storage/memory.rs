//! In-memory storage, available on all targets.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::{Error, ErrorKind, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::{BoxFuture, Storage, normalize_path};

#[derive(Debug, Clone)]
struct StoredFile {
    content: String,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    files: HashMap<PathBuf, StoredFile>,
    /// Directories that exist (implicitly created when files are added)
    directories: HashSet<PathBuf>,
}

impl State {
    fn add_parents(&mut self, path: &Path) {
        let mut current = path;
        while let Some(parent) = current.parent() {
            if !parent.as_os_str().is_empty() {
                self.directories.insert(parent.to_path_buf());
            }
            current = parent;
        }
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.as_os_str().is_empty() || self.directories.contains(path)
    }
}

/// An in-memory storage implementation.
///
/// Cloning is cheap and clones share the same underlying files, so a test can
/// hand one clone to the references and keep another to inspect the result.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    state: Arc<RwLock<State>>,
    base: PathBuf,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new empty in-memory storage
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            base: PathBuf::from("/"),
        }
    }

    /// Create a storage pre-populated with `(path, content)` entries
    pub fn with_files<P, C>(entries: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: AsRef<Path>,
        C: Into<String>,
    {
        let storage = Self::new();
        {
            let mut state = storage.write_state();
            let now = Utc::now();
            for (path, content) in entries {
                let path = normalize_path(path.as_ref());
                state.add_parents(&path);
                state.files.insert(
                    path,
                    StoredFile {
                        content: content.into(),
                        created: now,
                        updated: now,
                    },
                );
            }
        }
        storage
    }

    /// Use a different backend-absolute base path (only affects [`Storage::resolve`])
    pub fn with_base_path(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = base.into();
        self
    }

    /// Export all files as `(path, content)` pairs, sorted by path
    pub fn export_entries(&self) -> Vec<(String, String)> {
        let state = self.read_state();
        let mut entries: Vec<_> = state
            .files
            .iter()
            .map(|(path, file)| (path.to_string_lossy().to_string(), file.content.clone()))
            .collect();
        entries.sort();
        entries
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn not_found(path: &Path) -> Error {
        Error::new(ErrorKind::NotFound, format!("File not found: {:?}", path))
    }

    fn stored(&self, path: &Path) -> Result<StoredFile> {
        let normalized = normalize_path(path);
        self.read_state()
            .files
            .get(&normalized)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }
}

impl Storage for InMemoryStorage {
    fn read_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Option<String>>> {
        Box::pin(async move {
            let normalized = normalize_path(path);
            let state = self.read_state();
            Ok(state.files.get(&normalized).map(|f| f.content.clone()))
        })
    }

    fn read_directory_file_names<'a>(
        &'a self,
        path: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move {
            let normalized = normalize_path(path);
            let state = self.read_state();

            if !state.is_directory(&normalized) {
                return Err(Error::new(
                    ErrorKind::NotFound,
                    format!("Directory not found: {:?}", path),
                ));
            }

            let children = state
                .files
                .keys()
                .chain(state.directories.iter())
                .filter(|child| child.parent() == Some(normalized.as_path()))
                .filter_map(|child| child.file_name())
                .map(|name| name.to_string_lossy().to_string())
                .collect::<BTreeSet<_>>();

            Ok(children.into_iter().collect())
        })
    }

    fn is_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let normalized = normalize_path(path);
            self.read_state().files.contains_key(&normalized)
        })
    }

    fn is_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let normalized = normalize_path(path);
            self.read_state().is_directory(&normalized)
        })
    }

    fn file_size<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<u64>> {
        Box::pin(async move { Ok(self.stored(path)?.content.len() as u64) })
    }

    fn file_updated_time<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<DateTime<Utc>>> {
        Box::pin(async move { Ok(self.stored(path)?.updated) })
    }

    fn file_created_time<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<DateTime<Utc>>> {
        Box::pin(async move { Ok(self.stored(path)?.created) })
    }

    fn base_path(&self) -> &Path {
        &self.base
    }

    fn write_file<'a>(&'a self, path: &'a Path, content: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let normalized = normalize_path(path);
            let mut state = self.write_state();
            if state.directories.contains(&normalized) {
                return Err(Error::new(
                    ErrorKind::IsADirectory,
                    format!("Path is a directory: {:?}", path),
                ));
            }

            state.add_parents(&normalized);
            let now = Utc::now();
            let created = state
                .files
                .get(&normalized)
                .map(|f| f.created)
                .unwrap_or(now);
            state.files.insert(
                normalized,
                StoredFile {
                    content: content.to_string(),
                    created,
                    updated: now,
                },
            );
            Ok(())
        })
    }

    fn delete_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let normalized = normalize_path(path);
            match self.write_state().files.remove(&normalized) {
                Some(_) => Ok(()),
                None => Err(Self::not_found(path)),
            }
        })
    }

    fn create_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let normalized = normalize_path(path);
            let mut state = self.write_state();
            if state.files.contains_key(&normalized) {
                return Err(Error::new(
                    ErrorKind::AlreadyExists,
                    format!("A file exists at {:?}", path),
                ));
            }
            state.add_parents(&normalized);
            if !normalized.as_os_str().is_empty() {
                state.directories.insert(normalized);
            }
            Ok(())
        })
    }

    fn create_empty_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let normalized = normalize_path(path);
            {
                let state = self.read_state();
                if state.is_directory(&normalized) || state.files.contains_key(&normalized) {
                    return Err(Error::new(
                        ErrorKind::AlreadyExists,
                        format!("Already exists: {:?}", path),
                    ));
                }
            }
            self.create_directory(path).await
        })
    }
}
