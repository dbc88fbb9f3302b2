//! Custom schema field system.
//!
//! A consumer declares a [`CustomSchema`]: field name → [`FieldDefinition`]
//! (`type`, `required`, and for relations the `path` of the related directory).
//! Each markdown document's frontmatter is then read into a [`Meta`] record
//! keyed by that schema, with every value typed as a [`FieldValue`].
//!
//! # Validation policy
//!
//! There are two tiers, applied uniformly:
//!
//! - **Tolerant** ([`FieldValue::from_type`]), used when parsing documents:
//!   missing or invalid input becomes the type's default for required fields
//!   and its empty value (`null` / `[]`) for optional ones. Hand-edited files
//!   never fail to load because of a bad value.
//! - **Strict** ([`FieldValue::validate`]), used when a caller constructs
//!   values explicitly ([`Meta::with_value`], [`Meta::try_from_front_matter`])
//!   and when a schema itself is built ([`CustomSchema::add_field`]).

mod meta;
mod value;

pub use meta::Meta;
pub use value::FieldValue;

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// The closed set of field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Number,
    Boolean,
    Relation,
    SelectText,
    SelectNumber,
    MultiText,
    MultiNumber,
    MultiRelation,
    MultiSelectText,
    MultiSelectNumber,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [FieldType; 11] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Relation,
        FieldType::SelectText,
        FieldType::SelectNumber,
        FieldType::MultiText,
        FieldType::MultiNumber,
        FieldType::MultiRelation,
        FieldType::MultiSelectText,
        FieldType::MultiSelectNumber,
    ];

    /// The type tag as written in frontmatter.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Relation => "relation",
            FieldType::SelectText => "select-text",
            FieldType::SelectNumber => "select-number",
            FieldType::MultiText => "multi-text",
            FieldType::MultiNumber => "multi-number",
            FieldType::MultiRelation => "multi-relation",
            FieldType::MultiSelectText => "multi-select-text",
            FieldType::MultiSelectNumber => "multi-select-number",
        }
    }

    /// Returns true for list-valued types.
    pub fn is_multi(self) -> bool {
        match self {
            FieldType::Text
            | FieldType::Number
            | FieldType::Boolean
            | FieldType::Relation
            | FieldType::SelectText
            | FieldType::SelectNumber => false,
            FieldType::MultiText
            | FieldType::MultiNumber
            | FieldType::MultiRelation
            | FieldType::MultiSelectText
            | FieldType::MultiSelectNumber => true,
        }
    }

    /// Returns true for `relation` and `multi-relation`.
    pub fn is_relation(self) -> bool {
        matches!(self, FieldType::Relation | FieldType::MultiRelation)
    }

    /// Returns true for the selectable types, whose values come from `options`.
    pub fn is_select(self) -> bool {
        matches!(
            self,
            FieldType::SelectText
                | FieldType::SelectNumber
                | FieldType::MultiSelectText
                | FieldType::MultiSelectNumber
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FolioError::UnknownFieldType(s.to_string()))
    }
}

/// A field declaration in a [`CustomSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    /// Directory holding the related documents (relation types only).
    /// May be relative to the document's own directory, e.g. `../authors`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FieldDefinition {
    /// An optional field of the given type.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            path: None,
        }
    }

    pub fn text() -> Self {
        Self::new(FieldType::Text)
    }

    pub fn number() -> Self {
        Self::new(FieldType::Number)
    }

    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    pub fn relation(path: impl Into<String>) -> Self {
        Self::new(FieldType::Relation).with_path(path)
    }

    pub fn multi_relation(path: impl Into<String>) -> Self {
        Self::new(FieldType::MultiRelation).with_path(path)
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the related directory path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    fn check(&self, name: &str) -> Result<()> {
        let has_path = self.path.as_deref().is_some_and(|p| !p.trim().is_empty());
        if self.field_type.is_relation() && !has_path {
            return Err(FolioError::InvalidSchema(format!(
                "relation field '{}' must declare a path",
                name
            )));
        }
        if !self.field_type.is_relation() && self.path.is_some() {
            return Err(FolioError::InvalidSchema(format!(
                "field '{}' of type {} cannot declare a path",
                name, self.field_type
            )));
        }
        Ok(())
    }
}

/// The consumer-declared field schema for markdown documents.
///
/// Immutable once built; references share it behind an `Arc`. Deserializing
/// checks every definition the same way [`CustomSchema::add_field`] does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, FieldDefinition>",
    into = "IndexMap<String, FieldDefinition>"
)]
pub struct CustomSchema {
    fields: IndexMap<String, FieldDefinition>,
}

impl TryFrom<IndexMap<String, FieldDefinition>> for CustomSchema {
    type Error = FolioError;

    fn try_from(fields: IndexMap<String, FieldDefinition>) -> Result<Self> {
        fields
            .into_iter()
            .try_fold(Self::new(), |schema, (name, def)| schema.add_field(name, def))
    }
}

impl From<CustomSchema> for IndexMap<String, FieldDefinition> {
    fn from(schema: CustomSchema) -> Self {
        schema.fields
    }
}

impl CustomSchema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, rejecting duplicates and malformed definitions.
    pub fn add_field(mut self, name: impl Into<String>, definition: FieldDefinition) -> Result<Self> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(FolioError::InvalidSchema(format!(
                "field '{}' is declared twice",
                name
            )));
        }
        definition.check(&name)?;
        self.fields.insert(name, definition);
        Ok(self)
    }

    /// Parse a schema from YAML (`name: { type: text, required: true }` entries).
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let fields: IndexMap<String, FieldDefinition> = serde_yaml::from_str(yaml)?;
        Self::try_from(fields)
    }

    /// Look up a field definition.
    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Returns true if the field is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Declared relation path of a relation field.
    pub fn relation_path(&self, name: &str) -> Option<&str> {
        self.get(name)
            .filter(|def| def.field_type.is_relation())
            .and_then(|def| def.path.as_deref())
    }

    /// Iterate over the declared fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDefinition)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_type_round_trips_its_tag() {
        for field_type in FieldType::ALL {
            assert_eq!(field_type.as_str().parse::<FieldType>().unwrap(), field_type);
            let yaml = serde_yaml::to_string(&field_type).unwrap();
            assert_eq!(yaml.trim(), field_type.as_str());
        }
    }

    #[test]
    fn test_all_lists_each_variant_once() {
        let mut seen = std::collections::HashSet::new();
        for field_type in FieldType::ALL {
            assert!(seen.insert(field_type));
        }
        assert_eq!(seen.len(), 11);
        assert_eq!(
            FieldType::ALL.iter().filter(|t| t.is_multi()).count(),
            5
        );
    }

    #[test]
    fn test_unknown_type_tag() {
        let err = "date".parse::<FieldType>().unwrap_err();
        assert!(matches!(err, FolioError::UnknownFieldType(t) if t == "date"));
    }

    #[test]
    fn test_schema_builder() {
        let schema = CustomSchema::new()
            .add_field("title", FieldDefinition::text().required())
            .unwrap()
            .add_field("author", FieldDefinition::relation("../authors"))
            .unwrap();

        assert_eq!(schema.len(), 2);
        assert!(schema.get("title").unwrap().required);
        assert_eq!(schema.relation_path("author"), Some("../authors"));
        assert_eq!(schema.relation_path("title"), None);
    }

    #[test]
    fn test_relation_without_path_is_rejected() {
        let result = CustomSchema::new().add_field("author", FieldDefinition::new(FieldType::Relation));
        assert!(matches!(result, Err(FolioError::InvalidSchema(_))));
    }

    #[test]
    fn test_path_on_non_relation_is_rejected() {
        let result = CustomSchema::new().add_field("tags", FieldDefinition::text().with_path("x"));
        assert!(matches!(result, Err(FolioError::InvalidSchema(_))));
    }

    #[test]
    fn test_duplicate_field_is_rejected() {
        let result = CustomSchema::new()
            .add_field("a", FieldDefinition::text())
            .unwrap()
            .add_field("a", FieldDefinition::number());
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_from_yaml() {
        let schema = CustomSchema::from_yaml_str(
            "title:\n  type: text\n  required: true\ntags:\n  type: multi-select-text\nauthors:\n  type: multi-relation\n  path: ../people\n",
        )
        .unwrap();
        let names: Vec<_> = schema.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["title", "tags", "authors"]);
        assert_eq!(schema.get("tags").unwrap().field_type, FieldType::MultiSelectText);
        assert!(!schema.get("tags").unwrap().required);
        assert_eq!(schema.relation_path("authors"), Some("../people"));
    }

    #[test]
    fn test_deserialize_checks_definitions() {
        let result = serde_yaml::from_str::<CustomSchema>("author:\n  type: relation\n");
        assert!(result.is_err());

        let result = serde_yaml::from_str::<CustomSchema>("title:\n  type: text\n  path: ../x\n");
        assert!(result.is_err());

        let schema: CustomSchema =
            serde_yaml::from_str("author:\n  type: relation\n  path: ../authors\n").unwrap();
        assert_eq!(schema.relation_path("author"), Some("../authors"));
        let yaml = serde_yaml::to_string(&schema).unwrap();
        assert_eq!(serde_yaml::from_str::<CustomSchema>(&yaml).unwrap(), schema);
    }
}
