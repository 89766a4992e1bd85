//! Deferred queries over a collection.

use std::cmp::Ordering;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::collection::{from_document, Collection};
use super::types::{Document, Filter, SortOrder};
use crate::error::Result;

/// A query descriptor produced by [`Collection::find`].
///
/// `sort` and `limit` return new cursors and leave the receiver unchanged.
/// Storage is read only when the cursor is materialized, and again on every
/// materialization.
#[derive(Debug, Clone)]
pub struct Cursor {
    collection: Collection,
    filter: Filter,
    sort: Option<(String, SortOrder)>,
    limit: Option<usize>,
}

impl Cursor {
    pub(crate) fn new(collection: Collection, filter: Filter) -> Self {
        Self {
            collection,
            filter,
            sort: None,
            limit: None,
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Order results by `field`. Records missing the field sort first in
    /// ascending order. Records with equal keys keep their stored order.
    pub fn sort(&self, field: impl Into<String>, order: SortOrder) -> Cursor {
        Cursor {
            sort: Some((field.into(), order)),
            ..self.clone()
        }
    }

    /// Keep at most `count` results after filtering and sorting.
    /// A count of zero means no limit.
    pub fn limit(&self, count: usize) -> Cursor {
        Cursor {
            limit: Some(count),
            ..self.clone()
        }
    }

    /// Load the snapshot and apply filter, sort, the cursor's limit, then
    /// `limit` if given.
    pub fn to_list(&self, limit: Option<usize>) -> Result<Vec<Document>> {
        let mut records: Vec<Document> = self
            .collection
            .load()?
            .into_iter()
            .filter(|record| self.filter.matches(record))
            .collect();

        if let Some((field, order)) = &self.sort {
            records.sort_by(|a, b| {
                let ordering = compare_values(a.get(field), b.get(field));
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        for bound in [self.limit, limit].into_iter().flatten() {
            if bound > 0 {
                records.truncate(bound);
            }
        }

        Ok(records)
    }

    pub fn to_list_as<T: DeserializeOwned>(&self, limit: Option<usize>) -> Result<Vec<T>> {
        self.to_list(limit)?.into_iter().map(from_document).collect()
    }
}

/// Rank of a value's kind; absent and `null` rank lowest.
fn kind_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Array(x)), Some(Value::Array(y))) => x
            .iter()
            .zip(y.iter())
            .map(|(x, y)| compare_values(Some(x), Some(y)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}
