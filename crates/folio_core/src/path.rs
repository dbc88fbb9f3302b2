//! Path value types for files and directories in a content tree.
//!
//! Paths come in two flavors. `path` is backend-relative (what the storage
//! layer and every listing use) and `full_path` is the same location resolved
//! against the backend's base path.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::config::Config;

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A file location plus the names derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilePath {
    /// Display name: the file stem, or the parent directory's name for index files.
    pub name: String,
    pub path: PathBuf,
    pub full_path: PathBuf,
    pub name_with_extension: String,
}

impl FilePath {
    pub fn new(path: impl Into<PathBuf>, full_path: impl Into<PathBuf>, config: &Config) -> Self {
        let path = path.into();
        let name_with_extension = file_name_of(&path);

        let name = if name_with_extension == config.index_file_name {
            let directory = logical_directory(&path, config);
            match directory.file_name() {
                Some(n) => n.to_string_lossy().into_owned(),
                None => config.default_directory_name.clone(),
            }
        } else {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        Self {
            name,
            path,
            full_path: full_path.into(),
            name_with_extension,
        }
    }

    /// The lowercase extension, if any.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    /// Directory containing the file (backend-relative).
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Returns true if the file sits directly in an archive directory.
    pub fn is_archived(&self, config: &Config) -> bool {
        is_archived_file(&self.path, config)
    }
}

/// Returns true if `path`'s parent directory is an archive directory.
pub fn is_archived_file(path: &Path, config: &Config) -> bool {
    path.parent()
        .and_then(Path::file_name)
        .is_some_and(|n| n.to_string_lossy() == config.archive_directory_name)
}

/// The directory a file logically belongs to: its parent, or the parent's
/// parent when the file sits in an archive directory.
pub fn logical_directory(path: &Path, config: &Config) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new(""));
    if is_archived_file(path, config) {
        parent.parent().unwrap_or(Path::new("")).to_path_buf()
    } else {
        parent.to_path_buf()
    }
}

/// A directory location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DirectoryPath {
    /// Last path segment; empty for the root.
    pub name: String,
    pub path: PathBuf,
    pub full_path: PathBuf,
}

impl DirectoryPath {
    pub fn new(path: impl Into<PathBuf>, full_path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: file_name_of(&path),
            path,
            full_path: full_path.into(),
        }
    }

    /// Returns true for the backend root.
    pub fn is_root(&self) -> bool {
        self.path.as_os_str().is_empty() || self.path == Path::new(".")
    }

    /// The parent directory, or `None` for the root.
    pub fn parent(&self) -> Option<DirectoryPath> {
        if self.is_root() {
            return None;
        }
        let path = self.path.parent().unwrap_or(Path::new(""));
        let full_path = self.full_path.parent().unwrap_or(Path::new(""));
        Some(DirectoryPath::new(path, full_path))
    }

    /// A child directory.
    pub fn join(&self, name: &str) -> DirectoryPath {
        DirectoryPath::new(self.path.join(name), self.full_path.join(name))
    }

    /// Path segments from the root, without `.` components.
    pub fn segments(&self) -> Vec<String> {
        self.path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect()
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.segments().len()
    }

    /// Returns true if this is an archive directory.
    pub fn is_archived(&self, config: &Config) -> bool {
        self.name == config.archive_directory_name
    }

    /// Returns true for dot-directories.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// Title for display: the directory name, or the configured placeholder for the root.
    pub fn display_name(&self, config: &Config) -> String {
        if self.name.is_empty() {
            config.default_directory_name.clone()
        } else {
            self.name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_path_names() {
        let config = Config::default();
        let path = FilePath::new("docs/guide/intro.md", "/base/docs/guide/intro.md", &config);
        assert_eq!(path.name, "intro");
        assert_eq!(path.name_with_extension, "intro.md");
        assert_eq!(path.extension().as_deref(), Some("md"));
        assert_eq!(path.directory(), Path::new("docs/guide"));
    }

    #[test]
    fn test_index_file_is_named_after_its_directory() {
        let config = Config::default();
        assert_eq!(FilePath::new("docs/guide/index.md", "", &config).name, "guide");
        assert_eq!(FilePath::new("index.md", "", &config).name, "Untitled");
    }

    #[test]
    fn test_archived_file() {
        let config = Config::default();
        let path = FilePath::new("docs/_/old.md", "", &config);
        assert!(path.is_archived(&config));
        assert_eq!(logical_directory(&path.path, &config), PathBuf::from("docs"));
        assert!(!FilePath::new("docs/old.md", "", &config).is_archived(&config));
    }

    #[test]
    fn test_directory_path() {
        let config = Config::default();
        let dir = DirectoryPath::new("docs/guide", "/base/docs/guide");
        assert_eq!(dir.name, "guide");
        assert_eq!(dir.depth(), 2);
        assert_eq!(dir.segments(), vec!["docs", "guide"]);

        let parent = dir.parent().unwrap();
        assert_eq!(parent.path, PathBuf::from("docs"));
        assert_eq!(parent.full_path, PathBuf::from("/base/docs"));
        assert!(parent.parent().unwrap().is_root());
        assert!(parent.parent().unwrap().parent().is_none());

        assert!(dir.join("_").is_archived(&config));
        assert!(DirectoryPath::new(".git", "").is_hidden());
        assert_eq!(DirectoryPath::new("", "/base").display_name(&config), "Untitled");
    }
}
