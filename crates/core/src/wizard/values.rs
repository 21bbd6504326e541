use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::wizard::schema::{FieldKind, FieldSchema};
use crate::wizard::WizardError;

pub type Row = BTreeMap<String, FieldValue>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Number(Decimal),
    Date(NaiveDate),
    Rows(Vec<Row>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(value) => value.trim().is_empty(),
            Self::List(values) => values.is_empty(),
            Self::Rows(rows) => rows.is_empty(),
            Self::Number(_) | Self::Date(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::List(values) => values.join(", "),
            Self::Number(value) => value.normalize().to_string(),
            Self::Date(value) => value.format("%Y-%m-%d").to_string(),
            Self::Rows(rows) => format!("{} item(s)", rows.len()),
        }
    }

    /// Payload form. Numbers go out as JSON numbers rather than strings.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(value) => Value::String(value.clone()),
            Self::List(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
            Self::Number(value) => serde_json::Number::from_str(&value.normalize().to_string())
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(value.to_string())),
            Self::Date(value) => Value::String(value.format("%Y-%m-%d").to_string()),
            Self::Rows(rows) => Value::Array(
                rows.iter()
                    .map(|row| {
                        let mut object = serde_json::Map::new();
                        for (key, value) in row {
                            insert_nested(&mut object, key, value.to_json());
                        }
                        Value::Object(object)
                    })
                    .collect(),
            ),
        }
    }

    /// Reads a loosely typed answer (e.g. from an answers file) for `field`.
    pub fn from_json(field: &FieldSchema, raw: &Value) -> Result<Self, WizardError> {
        let invalid = |expected: &str| WizardError::InvalidValue {
            field: field.key.clone(),
            message: format!("expected {expected}"),
        };

        match &field.kind {
            FieldKind::Text
            | FieldKind::LongText
            | FieldKind::Select { .. }
            | FieldKind::DependentSelect { .. } => match raw {
                Value::String(value) => Ok(Self::Text(value.clone())),
                Value::Number(value) => Ok(Self::Text(value.to_string())),
                Value::Bool(value) => Ok(Self::Text(if *value { "yes" } else { "no" }.to_string())),
                _ => Err(invalid("a string")),
            },
            FieldKind::MultiSelect { .. } | FieldKind::DependentMultiSelect { .. } => match raw {
                Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string).ok_or_else(|| invalid("strings")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::List),
                Value::String(value) => Ok(Self::List(vec![value.clone()])),
                _ => Err(invalid("a list of strings")),
            },
            FieldKind::Number { .. } => {
                let text = match raw {
                    Value::Number(value) => value.to_string(),
                    Value::String(value) => value.trim().to_string(),
                    _ => return Err(invalid("a number")),
                };
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .map(Self::Number)
                    .map_err(|_| invalid("a number"))
            }
            FieldKind::Date => {
                let text = raw.as_str().ok_or_else(|| invalid("a YYYY-MM-DD date"))?;
                NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                    .map(Self::Date)
                    .map_err(|_| invalid("a YYYY-MM-DD date"))
            }
            FieldKind::LineItems { columns, .. } => {
                let items = raw.as_array().ok_or_else(|| invalid("a list of rows"))?;
                let mut rows = Vec::with_capacity(items.len());
                for item in items {
                    let object = item.as_object().ok_or_else(|| invalid("a list of rows"))?;
                    let mut row = Row::new();
                    for column in columns {
                        if let Some(cell) = object.get(&column.key) {
                            row.insert(column.key.clone(), Self::from_json(column, cell)?);
                        }
                    }
                    rows.push(row);
                }
                Ok(Self::Rows(rows))
            }
        }
    }
}

/// Draft values keyed by field key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormValues {
    values: BTreeMap<String, FieldValue>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    /// A value is filled when present and not blank.
    pub fn is_filled(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_blank())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.values.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Writes `value` under a dotted key, creating intermediate objects.
pub(crate) fn insert_nested(object: &mut serde_json::Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            object.insert(key.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = object
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(serde_json::Map::new());
            }
            if let Value::Object(child) = entry {
                insert_nested(child, rest, value);
            }
        }
    }
}
