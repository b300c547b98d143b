//! Page assemblers. Each builds its component tree on the caller's builder
//! and returns, alongside the root id, the data-model contents its bindings
//! read from.

use chrono::{DateTime, Utc};
use shared::{
    builder::Layout,
    data_model::{value_map_from_entries, DataEntry, ModelValue},
    domain::Tag,
    protocol::{Alignment, Distribution},
};

pub mod error;
pub mod layout;
pub mod tags;
pub mod tickets;

pub(crate) const CENTERED: Layout = Layout::aligned(Alignment::Center);
pub(crate) const SPREAD: Layout = Layout::new(Distribution::SpaceBetween, Alignment::Center);
pub(crate) const PLAIN: Layout = Layout {
    alignment: None,
    distribution: None,
};

/// Contents for one `dataModelUpdate`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPatch {
    pub path: String,
    pub contents: Vec<DataEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageOutput {
    pub root: String,
    pub data: Vec<DataPatch>,
    /// Non-fatal problems hit while assembling; logged by the render cycle.
    pub warnings: Vec<String>,
}

impl PageOutput {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            data: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_data(mut self, path: impl Into<String>, contents: Vec<DataEntry>) -> Self {
        self.data.push(DataPatch {
            path: path.into(),
            contents,
        });
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn data_for(&self, path: &str) -> Option<&[DataEntry]> {
        self.data
            .iter()
            .find(|patch| patch.path == path)
            .map(|patch| patch.contents.as_slice())
    }
}

type Fields = Vec<(&'static str, ModelValue)>;

/// `<prefix>0, <prefix>1, …` maps, one per item, for template lists.
pub(crate) fn indexed_maps<I>(
    prefix: &str,
    items: impl IntoIterator<Item = I>,
    fields: impl Fn(I) -> Fields,
) -> Vec<DataEntry> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| DataEntry::map(format!("{prefix}{i}"), value_map_from_entries(fields(item))))
        .collect()
}

pub(crate) fn tag_fields(tag: &Tag) -> Fields {
    vec![
        ("id", tag.id.as_str().into()),
        ("name", tag.name.as_str().into()),
        ("color", tag.color.as_str().into()),
    ]
}

pub(crate) fn date_only(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

pub(crate) fn date_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
