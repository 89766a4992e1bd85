//! Query and mutation descriptors for the document store.

use serde::Serialize;
use serde_json::Value;

use crate::error::{FolioError, Result};

/// One stored record: an ordered mapping of field name to JSON value.
pub type Document = serde_json::Map<String, Value>;

/// Equality filter over record fields.
///
/// A record matches when every filter field is present in the record with an
/// exactly equal value. A missing field never matches, not even a `null`
/// filter value. The empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Document,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on the conventional `id` field.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq("id", id.into())
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }

    pub fn matches(&self, record: &Document) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }
}

impl From<Document> for Filter {
    fn from(fields: Document) -> Self {
        Self { fields }
    }
}

/// Field-level changes applied by `update_one`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    set: Document,
    unset: Vec<String>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    /// Set every field of `fields`, keeping their order.
    pub fn set_all(mut self, fields: Document) -> Self {
        self.set.extend(fields);
        self
    }

    /// Set every field of a serializable partial record.
    ///
    /// Fields the value omits (e.g. `None` options skipped during
    /// serialization) are left untouched.
    pub fn set_from<T: Serialize>(self, partial: &T) -> Result<Self> {
        match serde_json::to_value(partial)? {
            Value::Object(fields) => Ok(self.set_all(fields)),
            _ => Err(FolioError::Validation(
                "Update payload must serialize to a JSON object".to_string(),
            )),
        }
    }

    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.unset.push(field.into());
        self
    }

    pub fn set_fields(&self) -> &Document {
        &self.set
    }

    pub fn unset_fields(&self) -> &[String] {
        &self.unset
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }

    /// Merge `set` into the record, then remove `unset` fields.
    pub fn apply(&self, record: &mut Document) {
        for (field, value) in &self.set {
            record.insert(field.clone(), value.clone());
        }
        for field in &self.unset {
            record.remove(field);
        }
    }
}

/// Sort direction for [`Cursor::sort`](super::Cursor::sort).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl TryFrom<i32> for SortOrder {
    type Error = FolioError;

    /// `1` is ascending and `-1` descending, as in document-database drivers.
    fn try_from(direction: i32) -> Result<Self> {
        match direction {
            1 => Ok(SortOrder::Ascending),
            -1 => Ok(SortOrder::Descending),
            other => Err(FolioError::InvalidInput(format!(
                "Sort direction must be 1 or -1 (got {})",
                other
            ))),
        }
    }
}

/// Outcome of `update_one`.
///
/// No match without upsert is reported as zero counts; the caller decides
/// whether that is a not-found condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
    /// Generated `_id` of the record inserted by an upsert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<String>,
}

/// Outcome of `delete_one`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    pub deleted_count: u64,
}
