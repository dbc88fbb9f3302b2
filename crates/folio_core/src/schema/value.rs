use serde_yaml::Value;

use super::{FieldDefinition, FieldType};
use crate::error::{FolioError, Result};

/// A typed frontmatter value. There is one variant per [`FieldType`].
///
/// Scalars are `None` when absent; list types are never absent, only empty.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Number(Option<f64>),
    Boolean(Option<bool>),
    Relation(Option<String>),
    SelectText(Option<String>),
    SelectNumber(Option<f64>),
    MultiText(Vec<String>),
    MultiNumber(Vec<f64>),
    MultiRelation(Vec<String>),
    MultiSelectText(Vec<String>),
    MultiSelectNumber(Vec<f64>),
}

impl FieldValue {
    /// The field type this value belongs to.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Number(_) => FieldType::Number,
            FieldValue::Boolean(_) => FieldType::Boolean,
            FieldValue::Relation(_) => FieldType::Relation,
            FieldValue::SelectText(_) => FieldType::SelectText,
            FieldValue::SelectNumber(_) => FieldType::SelectNumber,
            FieldValue::MultiText(_) => FieldType::MultiText,
            FieldValue::MultiNumber(_) => FieldType::MultiNumber,
            FieldValue::MultiRelation(_) => FieldType::MultiRelation,
            FieldValue::MultiSelectText(_) => FieldType::MultiSelectText,
            FieldValue::MultiSelectNumber(_) => FieldType::MultiSelectNumber,
        }
    }

    /// The value a required field takes when its input is missing or invalid.
    ///
    /// `relation` has no meaningful default id, so it stays `None`.
    pub fn default_value(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => FieldValue::Text(Some(String::new())),
            FieldType::Number => FieldValue::Number(Some(0.0)),
            FieldType::Boolean => FieldValue::Boolean(Some(false)),
            FieldType::Relation => FieldValue::Relation(None),
            FieldType::SelectText => FieldValue::SelectText(Some(String::new())),
            FieldType::SelectNumber => FieldValue::SelectNumber(Some(0.0)),
            multi => Self::empty_value(multi),
        }
    }

    /// The value an optional field takes when its input is missing or invalid.
    pub fn empty_value(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => FieldValue::Text(None),
            FieldType::Number => FieldValue::Number(None),
            FieldType::Boolean => FieldValue::Boolean(None),
            FieldType::Relation => FieldValue::Relation(None),
            FieldType::SelectText => FieldValue::SelectText(None),
            FieldType::SelectNumber => FieldValue::SelectNumber(None),
            FieldType::MultiText => FieldValue::MultiText(Vec::new()),
            FieldType::MultiNumber => FieldValue::MultiNumber(Vec::new()),
            FieldType::MultiRelation => FieldValue::MultiRelation(Vec::new()),
            FieldType::MultiSelectText => FieldValue::MultiSelectText(Vec::new()),
            FieldType::MultiSelectNumber => FieldValue::MultiSelectNumber(Vec::new()),
        }
    }

    fn fallback(definition: &FieldDefinition) -> Self {
        if definition.required {
            Self::default_value(definition.field_type)
        } else {
            Self::empty_value(definition.field_type)
        }
    }

    /// Tolerant conversion of raw frontmatter input.
    ///
    /// Numbers and booleans are accepted as text, numeric strings as numbers,
    /// `"true"`/`"false"` as booleans, and a lone scalar as a one-element list.
    /// List elements that cannot be converted are dropped. Anything else falls
    /// back to the default (required) or empty (optional) value.
    pub fn from_type(key: &str, definition: &FieldDefinition, raw: Option<&Value>) -> Self {
        let Some(raw) = raw.filter(|v| !v.is_null()) else {
            return Self::fallback(definition);
        };

        convert(definition.field_type, raw, false).unwrap_or_else(|| {
            log::warn!(
                "Field '{}' expected {}, found {}; using fallback",
                key,
                definition.field_type,
                describe(raw)
            );
            Self::fallback(definition)
        })
    }

    /// Strict conversion of raw input: values must already have the field's type.
    ///
    /// A missing value is an error for required fields and the empty value for
    /// optional ones.
    pub fn validate(key: &str, definition: &FieldDefinition, raw: Option<&Value>) -> Result<Self> {
        let Some(raw) = raw.filter(|v| !v.is_null()) else {
            if definition.required {
                return Err(FolioError::MissingRequiredField(key.to_string()));
            }
            return Ok(Self::empty_value(definition.field_type));
        };

        convert(definition.field_type, raw, true).ok_or_else(|| FolioError::InvalidFieldValue {
            field: key.to_string(),
            expected: definition.field_type,
            found: describe(raw).to_string(),
        })
    }

    /// Returns true for `None` scalars and empty lists.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(v) | FieldValue::Relation(v) | FieldValue::SelectText(v) => v.is_none(),
            FieldValue::Number(v) | FieldValue::SelectNumber(v) => v.is_none(),
            FieldValue::Boolean(v) => v.is_none(),
            FieldValue::MultiText(v)
            | FieldValue::MultiRelation(v)
            | FieldValue::MultiSelectText(v) => v.is_empty(),
            FieldValue::MultiNumber(v) | FieldValue::MultiSelectNumber(v) => v.is_empty(),
        }
    }

    /// The YAML form written back to frontmatter. Integral numbers are written as integers.
    pub fn to_yaml(&self) -> Value {
        fn text(v: &Option<String>) -> Value {
            v.as_ref().map_or(Value::Null, |s| Value::String(s.clone()))
        }
        fn texts(v: &[String]) -> Value {
            Value::Sequence(v.iter().map(|s| Value::String(s.clone())).collect())
        }
        fn numbers(v: &[f64]) -> Value {
            Value::Sequence(v.iter().copied().map(number_to_yaml).collect())
        }

        match self {
            FieldValue::Text(v) | FieldValue::Relation(v) | FieldValue::SelectText(v) => text(v),
            FieldValue::Number(v) | FieldValue::SelectNumber(v) => {
                v.map_or(Value::Null, number_to_yaml)
            }
            FieldValue::Boolean(v) => v.map_or(Value::Null, Value::Bool),
            FieldValue::MultiText(v)
            | FieldValue::MultiRelation(v)
            | FieldValue::MultiSelectText(v) => texts(v),
            FieldValue::MultiNumber(v) | FieldValue::MultiSelectNumber(v) => numbers(v),
        }
    }

    /// The string of a text-like scalar (`text`, `relation`, `select-text`).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) | FieldValue::Relation(v) | FieldValue::SelectText(v) => {
                v.as_deref()
            }
            _ => None,
        }
    }

    /// The number of a numeric scalar.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) | FieldValue::SelectNumber(v) => *v,
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(v) => *v,
            _ => None,
        }
    }

    /// The elements of a text-like list.
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            FieldValue::MultiText(v)
            | FieldValue::MultiRelation(v)
            | FieldValue::MultiSelectText(v) => Some(v),
            _ => None,
        }
    }

    /// The elements of a numeric list.
    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            FieldValue::MultiNumber(v) | FieldValue::MultiSelectNumber(v) => Some(v),
            _ => None,
        }
    }
}

fn number_to_yaml(n: f64) -> Value {
    // 2^53: beyond this integral f64s are no longer exact
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::Number((n as i64).into())
    } else {
        Value::Number(n.into())
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn to_text(value: &Value, strict: bool) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if !strict => Some(n.to_string()),
        Value::Bool(b) if !strict => Some(b.to_string()),
        _ => None,
    }
}

fn to_number(value: &Value, strict: bool) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !strict => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn to_bool(value: &Value, strict: bool) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if !strict => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Relation ids are non-empty trimmed strings.
fn to_relation(value: &Value, strict: bool) -> Option<String> {
    to_text(value, strict)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn to_list<T>(value: &Value, strict: bool, element: impl Fn(&Value, bool) -> Option<T>) -> Option<Vec<T>> {
    match value {
        Value::Sequence(items) if strict => items.iter().map(|v| element(v, true)).collect(),
        Value::Sequence(items) => Some(items.iter().filter_map(|v| element(v, false)).collect()),
        _ if strict => None,
        scalar => Some(element(scalar, false).into_iter().collect()),
    }
}

fn convert(field_type: FieldType, raw: &Value, strict: bool) -> Option<FieldValue> {
    let value = match field_type {
        FieldType::Text => FieldValue::Text(Some(to_text(raw, strict)?)),
        FieldType::Number => FieldValue::Number(Some(to_number(raw, strict)?)),
        FieldType::Boolean => FieldValue::Boolean(Some(to_bool(raw, strict)?)),
        FieldType::Relation => FieldValue::Relation(Some(to_relation(raw, strict)?)),
        FieldType::SelectText => FieldValue::SelectText(Some(to_text(raw, strict)?)),
        FieldType::SelectNumber => FieldValue::SelectNumber(Some(to_number(raw, strict)?)),
        FieldType::MultiText => FieldValue::MultiText(to_list(raw, strict, to_text)?),
        FieldType::MultiNumber => FieldValue::MultiNumber(to_list(raw, strict, to_number)?),
        FieldType::MultiRelation => FieldValue::MultiRelation(to_list(raw, strict, to_relation)?),
        FieldType::MultiSelectText => FieldValue::MultiSelectText(to_list(raw, strict, to_text)?),
        FieldType::MultiSelectNumber => {
            FieldValue::MultiSelectNumber(to_list(raw, strict, to_number)?)
        }
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn required(field_type: FieldType) -> FieldDefinition {
        FieldDefinition {
            field_type,
            required: true,
            path: None,
        }
    }

    #[test]
    fn test_missing_required_takes_default_for_every_type() {
        for field_type in FieldType::ALL {
            let value = FieldValue::from_type("f", &required(field_type), None);
            assert_eq!(value, FieldValue::default_value(field_type));
            assert_eq!(value.field_type(), field_type);
        }
    }

    #[test]
    fn test_missing_optional_is_empty_for_every_type() {
        for field_type in FieldType::ALL {
            let value = FieldValue::from_type("f", &FieldDefinition::new(field_type), None);
            assert!(value.is_empty(), "{} should be empty", field_type);
            assert_eq!(value.field_type(), field_type);
        }
    }

    #[test]
    fn test_documented_defaults() {
        assert_eq!(FieldValue::default_value(FieldType::Text), FieldValue::Text(Some(String::new())));
        assert_eq!(FieldValue::default_value(FieldType::Number), FieldValue::Number(Some(0.0)));
        assert_eq!(FieldValue::default_value(FieldType::Boolean), FieldValue::Boolean(Some(false)));
        assert_eq!(FieldValue::default_value(FieldType::Relation), FieldValue::Relation(None));
        assert_eq!(
            FieldValue::default_value(FieldType::MultiRelation),
            FieldValue::MultiRelation(Vec::new())
        );
    }

    #[test]
    fn test_tolerant_coercions() {
        let text = FieldDefinition::text();
        assert_eq!(FieldValue::from_type("t", &text, Some(&yaml("42"))).as_str(), Some("42"));
        assert_eq!(FieldValue::from_type("t", &text, Some(&yaml("true"))).as_str(), Some("true"));

        let number = FieldDefinition::number();
        assert_eq!(FieldValue::from_type("n", &number, Some(&yaml("'3.5'"))).as_f64(), Some(3.5));
        assert_eq!(FieldValue::from_type("n", &number, Some(&yaml("abc"))).as_f64(), None);

        let boolean = FieldDefinition::boolean();
        assert_eq!(FieldValue::from_type("b", &boolean, Some(&yaml("'false'"))).as_bool(), Some(false));
    }

    #[test]
    fn test_invalid_required_falls_back_to_default() {
        let value = FieldValue::from_type("n", &required(FieldType::Number), Some(&yaml("[1, 2]")));
        assert_eq!(value, FieldValue::Number(Some(0.0)));
    }

    #[test]
    fn test_tolerant_lists() {
        let def = FieldDefinition::new(FieldType::MultiNumber);
        let value = FieldValue::from_type("m", &def, Some(&yaml("[1, 'x', '2', 3.5]")));
        assert_eq!(value, FieldValue::MultiNumber(vec![1.0, 2.0, 3.5]));

        let def = FieldDefinition::new(FieldType::MultiText);
        let value = FieldValue::from_type("m", &def, Some(&yaml("solo")));
        assert_eq!(value, FieldValue::MultiText(vec!["solo".to_string()]));
    }

    #[test]
    fn test_relation_ids_are_trimmed_and_non_empty() {
        let def = FieldDefinition::relation("authors");
        assert_eq!(
            FieldValue::from_type("a", &def, Some(&yaml("' ada '"))),
            FieldValue::Relation(Some("ada".to_string()))
        );
        assert_eq!(FieldValue::from_type("a", &def, Some(&yaml("''"))), FieldValue::Relation(None));
    }

    #[test]
    fn test_strict_rejects_coercions() {
        let err = FieldValue::validate("n", &FieldDefinition::number(), Some(&yaml("'3'"))).unwrap_err();
        assert!(matches!(
            err,
            FolioError::InvalidFieldValue { expected: FieldType::Number, ref found, .. } if found == "string"
        ));

        let def = FieldDefinition::new(FieldType::MultiText);
        assert!(FieldValue::validate("m", &def, Some(&yaml("solo"))).is_err());
        assert!(FieldValue::validate("m", &def, Some(&yaml("[a, 1]"))).is_err());
        assert_eq!(
            FieldValue::validate("m", &def, Some(&yaml("[a, b]"))).unwrap(),
            FieldValue::MultiText(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_strict_missing_required() {
        let err = FieldValue::validate("title", &required(FieldType::Text), None).unwrap_err();
        assert!(matches!(err, FolioError::MissingRequiredField(f) if f == "title"));
        assert_eq!(
            FieldValue::validate("title", &FieldDefinition::text(), None).unwrap(),
            FieldValue::Text(None)
        );
    }

    #[test]
    fn test_to_yaml_writes_integral_numbers_as_integers() {
        assert_eq!(serde_yaml::to_string(&FieldValue::Number(Some(3.0)).to_yaml()).unwrap(), "3\n");
        assert_eq!(serde_yaml::to_string(&FieldValue::Number(Some(2.5)).to_yaml()).unwrap(), "2.5\n");
        assert_eq!(FieldValue::Text(None).to_yaml(), Value::Null);
    }
}
