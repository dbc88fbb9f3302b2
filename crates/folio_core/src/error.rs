use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::schema::FieldType;

/// Unified error type for folio operations
#[derive(Debug, Error)]
pub enum FolioError {
    // IO errors
    #[error("File not found: '{0}'")]
    NotFound(PathBuf),

    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to move '{from}' to '{to}': {source}")]
    FileMove {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    // Frontmatter errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid frontmatter in '{path}': {message}")]
    InvalidFrontmatter { path: PathBuf, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Config errors
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    // Schema errors
    #[error("Field '{0}' is not declared in the schema")]
    UndeclaredField(String),

    #[error("Required field '{0}' is missing")]
    MissingRequiredField(String),

    #[error("Invalid value for field '{field}': expected {expected}, found {found}")]
    InvalidFieldValue {
        field: String,
        expected: FieldType,
        found: String,
    },

    #[error("Unknown field type '{0}'")]
    UnknownFieldType(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    // Reference errors
    #[error("'{0}' is not inside an archive directory")]
    NotArchived(PathBuf),

    #[error("'{0}' already exists")]
    AlreadyExists(PathBuf),
}

/// Result type alias for folio operations
pub type Result<T> = std::result::Result<T, FolioError>;

impl FolioError {
    /// Returns true for the "file does not exist" outcome, as opposed to an I/O failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FolioError::NotFound(_))
    }

    /// Convert to a serializable representation for IPC
    pub fn to_serializable(&self) -> SerializableError {
        SerializableError::from(self)
    }
}

/// A serializable representation of FolioError for IPC (e.g., a desktop shell or web worker)
#[derive(Debug, Clone, Serialize)]
pub struct SerializableError {
    /// Error kind/variant name
    pub kind: String,
    /// Human-readable error message
    pub message: String,
    /// Associated path (if applicable)
    pub path: Option<PathBuf>,
}

impl From<&FolioError> for SerializableError {
    fn from(err: &FolioError) -> Self {
        let kind = match err {
            FolioError::NotFound(_) => "NotFound",
            FolioError::FileRead { .. } => "FileRead",
            FolioError::FileWrite { .. } => "FileWrite",
            FolioError::FileMove { .. } => "FileMove",
            FolioError::DirectoryRead { .. } => "DirectoryRead",
            FolioError::Yaml(_) => "Yaml",
            FolioError::InvalidFrontmatter { .. } => "InvalidFrontmatter",
            FolioError::Json(_) => "Json",
            FolioError::ConfigParse(_) => "ConfigParse",
            FolioError::ConfigSerialize(_) => "ConfigSerialize",
            FolioError::UndeclaredField(_) => "UndeclaredField",
            FolioError::MissingRequiredField(_) => "MissingRequiredField",
            FolioError::InvalidFieldValue { .. } => "InvalidFieldValue",
            FolioError::UnknownFieldType(_) => "UnknownFieldType",
            FolioError::InvalidSchema(_) => "InvalidSchema",
            FolioError::NotArchived(_) => "NotArchived",
            FolioError::AlreadyExists(_) => "AlreadyExists",
        }
        .to_string();

        let path = match err {
            FolioError::NotFound(path) => Some(path.clone()),
            FolioError::FileRead { path, .. } => Some(path.clone()),
            FolioError::FileWrite { path, .. } => Some(path.clone()),
            FolioError::FileMove { from, .. } => Some(from.clone()),
            FolioError::DirectoryRead { path, .. } => Some(path.clone()),
            FolioError::InvalidFrontmatter { path, .. } => Some(path.clone()),
            FolioError::NotArchived(path) => Some(path.clone()),
            FolioError::AlreadyExists(path) => Some(path.clone()),
            _ => None,
        };

        Self {
            kind,
            message: err.to_string(),
            path,
        }
    }
}

impl From<FolioError> for SerializableError {
    fn from(err: FolioError) -> Self {
        SerializableError::from(&err)
    }
}
