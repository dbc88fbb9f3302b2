#![doc = include_str!("../README.md")]

/// Configuration options
pub mod config;

/// Documents and entities (index, markdown and unknown files)
pub mod document;

/// Error (common error types)
pub mod error;

/// Frontmatter parsing and serialization
pub mod frontmatter;

/// Schema persisted in index documents
pub mod index_schema;

/// Markdown text engine (frontmatter split, title and description)
pub mod markdown;

/// File and directory path values
pub mod path;

/// Lazy file and directory references
pub mod reference;

/// Custom schema field types, values and typed metadata
pub mod schema;

/// Storage abstraction and adapters
pub mod storage;

/// File tree building
pub mod tree;

pub use config::Config;
pub use document::{Document, IndexDocument, MarkdownDocument, UnknownDocument};
pub use error::{FolioError, Result};
pub use reference::{Context, DirectoryRef, FileRef, MarkdownFileRef};
pub use schema::{CustomSchema, FieldDefinition, FieldType, FieldValue, Meta};
pub use storage::Storage;
pub use tree::{FileTreeBuilder, TreeNode};
