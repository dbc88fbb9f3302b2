use std::ops::Index;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_yaml::Value;

use super::{CustomSchema, FieldType, FieldValue};
use crate::error::{FolioError, Result};
use crate::frontmatter::FrontMatter;

/// The typed frontmatter record of a markdown document.
///
/// Holds exactly one value per field declared in the schema. Keys in the file
/// that the schema does not declare are kept verbatim as extras and written
/// back after the declared fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    schema: Arc<CustomSchema>,
    values: IndexMap<String, FieldValue>,
    extra: FrontMatter,
}

impl Meta {
    /// A record with every declared field at its fallback value.
    pub fn empty(schema: Arc<CustomSchema>) -> Self {
        Self::from_front_matter(schema, &FrontMatter::new())
    }

    /// Read a frontmatter map tolerantly. Never fails.
    pub fn from_front_matter(schema: Arc<CustomSchema>, front_matter: &FrontMatter) -> Self {
        let values = schema
            .iter()
            .map(|(name, def)| {
                let value = FieldValue::from_type(name, def, front_matter.get(name));
                (name.to_string(), value)
            })
            .collect();
        let extra = undeclared(&schema, front_matter);

        Self {
            schema,
            values,
            extra,
        }
    }

    /// Read a frontmatter map strictly: a missing required field or a value of
    /// the wrong type is an error.
    pub fn try_from_front_matter(
        schema: Arc<CustomSchema>,
        front_matter: &FrontMatter,
    ) -> Result<Self> {
        let values = schema
            .iter()
            .map(|(name, def)| {
                FieldValue::validate(name, def, front_matter.get(name))
                    .map(|value| (name.to_string(), value))
            })
            .collect::<Result<IndexMap<_, _>>>()?;
        let extra = undeclared(&schema, front_matter);

        Ok(Self {
            schema,
            values,
            extra,
        })
    }

    /// The schema this record was read with.
    pub fn schema(&self) -> &CustomSchema {
        &self.schema
    }

    /// The value of a declared field.
    pub fn get(&self, key: &str) -> Result<&FieldValue> {
        self.values
            .get(key)
            .ok_or_else(|| FolioError::UndeclaredField(key.to_string()))
    }

    /// Declared field values in schema order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Frontmatter keys not declared in the schema.
    pub fn extra(&self) -> &FrontMatter {
        &self.extra
    }

    /// The raw YAML of any key, declared or extra.
    pub fn raw(&self, key: &str) -> Option<Value> {
        match self.values.get(key) {
            Some(value) => Some(value.to_yaml()),
            None => self.extra.get(key).cloned(),
        }
    }

    /// A copy with one declared field replaced. The value must match the field's type.
    pub fn with_value(&self, key: &str, value: FieldValue) -> Result<Self> {
        let definition = self
            .schema
            .get(key)
            .ok_or_else(|| FolioError::UndeclaredField(key.to_string()))?;

        if value.field_type() != definition.field_type {
            return Err(FolioError::InvalidFieldValue {
                field: key.to_string(),
                expected: definition.field_type,
                found: value.field_type().to_string(),
            });
        }
        if definition.required && value.is_empty() && !definition.field_type.is_multi() {
            return Err(FolioError::MissingRequiredField(key.to_string()));
        }

        let mut next = self.clone();
        next.values.insert(key.to_string(), value);
        Ok(next)
    }

    /// A copy with one key set from raw YAML. Declared keys are validated
    /// strictly; undeclared keys become extras.
    pub fn with_raw(&self, key: &str, raw: Value) -> Result<Self> {
        let mut next = self.clone();
        match self.schema.get(key) {
            Some(definition) => {
                let value = FieldValue::validate(key, definition, Some(&raw))?;
                next.values.insert(key.to_string(), value);
            }
            None => {
                next.extra.insert(key.to_string(), raw);
            }
        }
        Ok(next)
    }

    /// The frontmatter map to write: declared fields in schema order, then extras.
    ///
    /// Optional fields with no value are omitted, as is a relation with no target
    /// even when required. Other required fields are always written.
    pub fn to_front_matter(&self) -> FrontMatter {
        let mut out = FrontMatter::new();
        for (name, def) in self.schema.iter() {
            let Some(value) = self.values.get(name) else {
                continue;
            };
            if value.is_empty() && (!def.required || def.field_type == FieldType::Relation) {
                continue;
            }
            out.insert(name.to_string(), value.to_yaml());
        }
        for (key, value) in &self.extra {
            out.entry(key.clone()).or_insert_with(|| value.clone());
        }
        out
    }
}

/// Panics if `key` is not declared in the schema. Use [`Meta::get`] for a fallible lookup.
impl Index<&str> for Meta {
    type Output = FieldValue;

    fn index(&self, key: &str) -> &FieldValue {
        match self.values.get(key) {
            Some(value) => value,
            None => panic!("field '{}' is not declared in the schema", key),
        }
    }
}

fn undeclared(schema: &CustomSchema, front_matter: &FrontMatter) -> FrontMatter {
    front_matter
        .iter()
        .filter(|(key, _)| !schema.contains(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
