//! BigQuery schema ingestion types.
//!
//! `Field` mirrors the REST `schema.fields[]` representation (`name`, `type`,
//! `mode`, nested `fields`). The field tree is immutable once deserialized;
//! everything downstream borrows or clones it.

use std::fmt;

use serde::Deserialize;

/// Field cardinality. The wire repr may omit `mode`, which means `NULLABLE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    Required,
    #[default]
    Nullable,
    Repeated,
}

/// BigQuery field type tags.
///
/// Unrecognized tags deserialize to `Unknown` and are rejected during path
/// annotation rather than guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Bytes,
    #[serde(alias = "INT64")]
    Integer,
    #[serde(alias = "FLOAT64")]
    Float,
    Numeric,
    Bignumeric,
    #[serde(alias = "BOOL")]
    Boolean,
    Timestamp,
    Date,
    Time,
    Datetime,
    Geography,
    Json,
    Interval,
    Range,
    #[serde(alias = "STRUCT")]
    Record,
    #[serde(other)]
    Unknown,
}

impl FieldType {
    pub fn is_record(self) -> bool {
        matches!(self, FieldType::Record)
    }
}

/// One field of a table schema. `fields` is populated for records only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub mode: FieldMode,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Fully qualified `project.dataset.table` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }

    pub fn dataset_ref(&self) -> DatasetRef {
        DatasetRef::new(self.project.clone(), self.dataset.clone())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// Fully qualified `project.dataset` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    pub project: String,
    pub dataset: String,
}

impl DatasetRef {
    pub fn new(project: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
        }
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.project, self.dataset)
    }
}
