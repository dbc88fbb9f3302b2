//! The schema persisted inside a directory's index document.
//!
//! Every `index.md` may carry an `icon` and a `schema` in its frontmatter. The
//! schema describes the fields of the sibling markdown files. It is what a UI
//! uses to render columns and forms, and what relation resolution consults to
//! find the directory a relation field points at.
//!
//! ```yaml
//! ---
//! icon: 📚
//! schema:
//!   author:
//!     type: relation
//!     title: Author
//!     required: false
//!     description: null
//!     default: null
//!     path: ../authors
//! ---
//! ```
//!
//! Reading is permissive: missing sub-properties are backfilled, and a field
//! whose `type` is missing or unknown is dropped with a warning instead of
//! failing the whole index.

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

use crate::error::Result;
use crate::frontmatter::FrontMatter;
use crate::schema::{CustomSchema, FieldDefinition, FieldType};

/// One field of an [`IndexSchema`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexFieldDefinition {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub title: Option<String>,
    pub required: bool,
    pub description: Option<String>,
    pub default: Option<Value>,
    /// Allowed values of select fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
    /// Related directory of relation fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl IndexFieldDefinition {
    /// A definition with every optional sub-property unset.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            title: None,
            required: false,
            description: None,
            default: None,
            options: field_type.is_select().then(Vec::new),
            path: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_options(mut self, options: Vec<Value>) -> Self {
        self.options = Some(options);
        self
    }

    /// Read a field permissively. Returns `None` when the type is missing or unknown.
    pub fn from_value(name: &str, value: &Value) -> Option<Self> {
        let Some(map) = value.as_mapping() else {
            log::warn!("Dropping index schema field '{}': not a mapping", name);
            return None;
        };

        let field_type = match map.get("type").and_then(Value::as_str) {
            Some(tag) => match tag.parse::<FieldType>() {
                Ok(field_type) => field_type,
                Err(e) => {
                    log::warn!("Dropping index schema field '{}': {}", name, e);
                    return None;
                }
            },
            None => {
                log::warn!("Dropping index schema field '{}': missing type", name);
                return None;
            }
        };

        let options = match map.get("options") {
            Some(Value::Sequence(items)) => Some(items.clone()),
            _ => field_type.is_select().then(Vec::new),
        };

        Some(Self {
            field_type,
            title: lenient_string(map.get("title")),
            required: lenient_bool(map.get("required")),
            description: lenient_string(map.get("description")),
            default: map.get("default").filter(|v| !v.is_null()).cloned(),
            options,
            path: lenient_string(map.get("path")),
        })
    }
}

fn lenient_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// The `schema` mapping of an index document, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndexSchema {
    fields: IndexMap<String, IndexFieldDefinition>,
}

impl IndexSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `schema` value permissively. Anything but a mapping is an empty schema.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_mapping() else {
            if !value.is_null() {
                log::warn!("Ignoring index schema: expected a mapping");
            }
            return Self::new();
        };

        let fields = map
            .iter()
            .filter_map(|(key, def)| {
                let name = key.as_str()?;
                IndexFieldDefinition::from_value(name, def).map(|d| (name.to_string(), d))
            })
            .collect();
        Self { fields }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_yaml::to_value(self)?)
    }

    /// Add or replace a field.
    pub fn with_field(mut self, name: impl Into<String>, definition: IndexFieldDefinition) -> Self {
        self.fields.insert(name.into(), definition);
        self
    }

    pub fn get(&self, name: &str) -> Option<&IndexFieldDefinition> {
        self.fields.get(name)
    }

    /// The related directory declared for a relation field.
    pub fn relation_path(&self, name: &str) -> Option<&str> {
        self.get(name)
            .filter(|def| def.field_type.is_relation())
            .and_then(|def| def.path.as_deref())
            .filter(|p| !p.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexFieldDefinition)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert to a [`CustomSchema`], skipping fields that would not be valid there
    /// (relations without a path, paths on non-relations).
    pub fn to_custom_schema(&self) -> CustomSchema {
        self.iter().fold(CustomSchema::new(), |schema, (name, def)| {
            let definition = FieldDefinition {
                field_type: def.field_type,
                required: def.required,
                path: def.path.clone().filter(|_| def.field_type.is_relation()),
            };
            match schema.clone().add_field(name, definition) {
                Ok(next) => next,
                Err(e) => {
                    log::warn!("Skipping index field '{}': {}", name, e);
                    schema
                }
            }
        })
    }
}

/// The typed frontmatter of an index document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexMeta {
    pub icon: Option<String>,
    pub schema: IndexSchema,
    /// Whitelisted top-level keys carried through untouched.
    pub extras: FrontMatter,
}

impl IndexMeta {
    /// Read index frontmatter. Only `icon`, `schema` and the keys listed in
    /// `includes` are kept; everything else is dropped.
    pub fn from_front_matter(front_matter: &FrontMatter, includes: &[String]) -> Self {
        let icon = lenient_string(front_matter.get("icon")).filter(|s| !s.is_empty());
        let schema = front_matter
            .get("schema")
            .map(IndexSchema::from_value)
            .unwrap_or_default();

        let extras = includes
            .iter()
            .filter(|key| key.as_str() != "icon" && key.as_str() != "schema")
            .filter_map(|key| front_matter.get(key).map(|v| (key.clone(), v.clone())))
            .collect();

        Self {
            icon,
            schema,
            extras,
        }
    }

    /// The frontmatter map to write: `icon`, then `schema`, then the extras.
    /// Unset icons and empty schemas are omitted.
    pub fn to_front_matter(&self) -> Result<FrontMatter> {
        let mut out = FrontMatter::new();
        if let Some(icon) = &self.icon {
            out.insert("icon".to_string(), Value::String(icon.clone()));
        }
        if !self.schema.is_empty() {
            out.insert("schema".to_string(), self.schema.to_value()?);
        }
        for (key, value) in &self.extras {
            out.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Ok(out)
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_schema(mut self, schema: IndexSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Set an extra key. It is written back as-is.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }
}

/// Helper for building an `options` list of strings.
pub fn text_options<I, S>(options: I) -> Vec<Value>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    options.into_iter().map(|o| Value::String(o.into())).collect()
}
