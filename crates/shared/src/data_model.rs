//! Data-model entries carried by `dataModelUpdate` and the conversion from
//! loosely structured records into them.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEntry {
    pub key: String,
    #[serde(flatten)]
    pub value: DataValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataValue {
    ValueString(String),
    ValueNumber(Number),
    ValueBoolean(bool),
    ValueMap(Vec<DataEntry>),
}

impl DataEntry {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: DataValue::ValueString(value.into()),
        }
    }

    /// Integers keep their integral encoding on the wire.
    pub fn number(key: impl Into<String>, value: impl Into<Number>) -> Self {
        Self {
            key: key.into(),
            value: DataValue::ValueNumber(value.into()),
        }
    }

    pub fn boolean(key: impl Into<String>, value: bool) -> Self {
        Self {
            key: key.into(),
            value: DataValue::ValueBoolean(value),
        }
    }

    pub fn map(key: impl Into<String>, entries: Vec<DataEntry>) -> Self {
        Self {
            key: key.into(),
            value: DataValue::ValueMap(entries),
        }
    }
}

/// Closed set of value kinds accepted by [`value_map_from_entries`].
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Map(Vec<(String, ModelValue)>),
    Seq(Vec<ModelValue>),
}

impl ModelValue {
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ModelValue)>,
        K: Into<String>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Lifts a JSON value. Booleans are matched ahead of numbers so a flag
    /// can never be read back as `0`/`1`.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => Self::String(s),
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
            Value::Array(items) => Self::Seq(items.into_iter().map(Self::from_json).collect()),
            Value::Null => Self::Null,
        }
    }

    /// Display form used when a non-record sequence item is flattened to a
    /// string: `True`/`False`, `None`, numbers as written, nested
    /// collections in bracketed repr form.
    pub fn display_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            other => other.repr(),
        }
    }

    fn repr(&self) -> String {
        match self {
            Self::Null => "None".to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Self::Seq(items) => {
                let inner: Vec<String> = items.iter().map(Self::repr).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::Map(entries) => {
                let inner: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("'{}': {}", k, v.repr()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }
}

impl From<&str> for ModelValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ModelValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for ModelValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<bool> for ModelValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ModelValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for ModelValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for ModelValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// Non-finite floats have no JSON encoding and fall back to `0`.
impl From<f64> for ModelValue {
    fn from(value: f64) -> Self {
        Self::Number(Number::from_f64(value).unwrap_or_else(|| 0.into()))
    }
}

impl<T: Into<ModelValue>> From<Option<T>> for ModelValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<ModelValue>> From<Vec<T>> for ModelValue {
    fn from(values: Vec<T>) -> Self {
        Self::Seq(values.into_iter().map(Into::into).collect())
    }
}

/// Converts ordered key/value pairs into `valueMap` contents.
///
/// Strings, booleans, numbers and nested maps map onto their typed entries.
/// Sequences become a map keyed `item0, item1, …`; record items nest, every
/// other item is flattened to its display string. Nulls become empty strings.
pub fn value_map_from_entries<I, K>(entries: I) -> Vec<DataEntry>
where
    I: IntoIterator<Item = (K, ModelValue)>,
    K: Into<String>,
{
    entries
        .into_iter()
        .map(|(key, value)| entry_for(key.into(), value))
        .collect()
}

/// [`value_map_from_entries`] over a JSON object; anything that is not an
/// object yields no entries.
pub fn value_map_from_json(value: Value) -> Vec<DataEntry> {
    match ModelValue::from_json(value) {
        ModelValue::Map(entries) => value_map_from_entries(entries),
        _ => Vec::new(),
    }
}

fn entry_for(key: String, value: ModelValue) -> DataEntry {
    match value {
        ModelValue::String(s) => DataEntry::string(key, s),
        ModelValue::Bool(b) => DataEntry::boolean(key, b),
        ModelValue::Number(n) => DataEntry::number(key, n),
        ModelValue::Map(entries) => DataEntry::map(key, value_map_from_entries(entries)),
        ModelValue::Seq(items) => {
            let contents = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    ModelValue::Map(entries) => {
                        DataEntry::map(format!("item{i}"), value_map_from_entries(entries))
                    }
                    other => DataEntry::string(format!("item{i}"), other.display_text()),
                })
                .collect();
            DataEntry::map(key, contents)
        }
        ModelValue::Null => DataEntry::string(key, ""),
    }
}

#[cfg(test)]
#[path = "tests/data_model_tests.rs"]
mod tests;
