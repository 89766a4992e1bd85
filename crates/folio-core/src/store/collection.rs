//! A single named collection and its CRUD operations.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::cursor::Cursor;
use super::snapshot;
use super::types::{DeleteResult, Document, Filter, Update, UpdateResult};
use crate::error::{FolioError, Result};

/// Handle to one collection snapshot on disk.
///
/// Handles are cheap to clone. All handles the same [`Store`](super::Store)
/// returns for a name share one writer lock; no record data is cached in
/// memory, so every operation observes the latest snapshot.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl Collection {
    pub(crate) fn new(name: String, path: PathBuf, write_lock: Arc<Mutex<()>>) -> Self {
        Self {
            name,
            path,
            write_lock,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock out other writers of this collection for one read-modify-write.
    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock protects no broken state.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn load(&self) -> Result<Vec<Document>> {
        Ok(snapshot::load(&self.path)?.into_documents())
    }

    fn save(&self, records: &[Document]) -> Result<()> {
        snapshot::save(&self.path, records)
    }

    /// Append a record to the collection.
    ///
    /// Identifier uniqueness is the caller's responsibility.
    pub fn insert(&self, record: Document) -> Result<()> {
        let _guard = self.lock_writes();
        let mut records = self.load()?;
        records.push(record);
        self.save(&records)?;
        debug!(collection = %self.name, total = records.len(), "Inserted record");
        Ok(())
    }

    /// Append a typed record.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::Validation` if the value does not serialize to a
    /// JSON object.
    pub fn insert_as<T: Serialize>(&self, record: &T) -> Result<()> {
        self.insert(to_document(record)?)
    }

    /// Start a query. Nothing is read until the cursor is materialized.
    pub fn find(&self, filter: Filter) -> Cursor {
        Cursor::new(self.clone(), filter)
    }

    pub fn find_all(&self) -> Cursor {
        self.find(Filter::new())
    }

    /// First record in stored order matching `filter`, if any.
    pub fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|record| filter.matches(record)))
    }

    pub fn find_one_as<T: DeserializeOwned>(&self, filter: &Filter) -> Result<Option<T>> {
        self.find_one(filter)?.map(from_document).transpose()
    }

    /// Apply `update` to the first record matching `filter`.
    ///
    /// With `upsert` and no match, a new record built from the filter fields
    /// merged with the `set` fields is appended with a generated `_id`.
    /// A matched record always counts as modified.
    pub fn update_one(
        &self,
        filter: &Filter,
        update: &Update,
        upsert: bool,
    ) -> Result<UpdateResult> {
        let _guard = self.lock_writes();
        let mut records = self.load()?;

        if let Some(record) = records.iter_mut().find(|record| filter.matches(record)) {
            update.apply(record);
            self.save(&records)?;
            debug!(collection = %self.name, "Updated record");
            return Ok(UpdateResult {
                matched_count: 1,
                modified_count: 1,
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(UpdateResult::default());
        }

        let mut record = filter.fields().clone();
        update.apply(&mut record);
        let generated_id = Uuid::new_v4().to_string();
        record.insert("_id".to_string(), Value::String(generated_id.clone()));
        records.push(record);
        self.save(&records)?;
        debug!(collection = %self.name, upserted_id = %generated_id, "Upserted record");

        Ok(UpdateResult {
            matched_count: 0,
            modified_count: 1,
            upserted_id: Some(generated_id),
        })
    }

    /// Read, check and rewrite the first record matching `filter` while
    /// holding the collection's writer lock.
    ///
    /// `edit` sees the stored record and may change it in place. If it
    /// returns an error nothing is written. Returns `Ok(None)` when no record
    /// matches.
    pub fn modify_one<R, F>(&self, filter: &Filter, edit: F) -> Result<Option<R>>
    where
        F: FnOnce(&mut Document) -> Result<R>,
    {
        let _guard = self.lock_writes();
        let mut records = self.load()?;

        let Some(record) = records.iter_mut().find(|record| filter.matches(record)) else {
            return Ok(None);
        };
        let outcome = edit(record)?;
        self.save(&records)?;
        debug!(collection = %self.name, "Modified record");
        Ok(Some(outcome))
    }

    /// Append `record` unless a record matching `filter` already exists.
    ///
    /// The check and the append happen under one writer lock. Returns
    /// `true` if the record was inserted.
    pub fn insert_unless_exists(&self, filter: &Filter, record: Document) -> Result<bool> {
        let _guard = self.lock_writes();
        let mut records = self.load()?;

        if records.iter().any(|existing| filter.matches(existing)) {
            return Ok(false);
        }
        records.push(record);
        self.save(&records)?;
        debug!(collection = %self.name, total = records.len(), "Inserted record");
        Ok(true)
    }

    /// Remove the first record matching `filter`.
    pub fn delete_one(&self, filter: &Filter) -> Result<DeleteResult> {
        let _guard = self.lock_writes();
        let mut records = self.load()?;

        let Some(index) = records.iter().position(|record| filter.matches(record)) else {
            return Ok(DeleteResult::default());
        };
        records.remove(index);
        self.save(&records)?;
        debug!(collection = %self.name, remaining = records.len(), "Deleted record");

        Ok(DeleteResult { deleted_count: 1 })
    }

    /// Number of records matching `filter`; the empty filter counts all.
    pub fn count(&self, filter: &Filter) -> Result<usize> {
        let records = self.load()?;
        if filter.is_empty() {
            return Ok(records.len());
        }
        Ok(records.iter().filter(|record| filter.matches(record)).count())
    }
}

pub(crate) fn to_document<T: Serialize>(record: &T) -> Result<Document> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(FolioError::Validation(
            "Record must serialize to a JSON object".to_string(),
        )),
    }
}

pub(crate) fn from_document<T: DeserializeOwned>(record: Document) -> Result<T> {
    serde_json::from_value(Value::Object(record))
        .map_err(|e| FolioError::Validation(format!("Record does not match its schema: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn collection(dir: &Path) -> Collection {
        Collection::new(
            "contacts".to_string(),
            dir.join("contacts.json"),
            Arc::new(Mutex::new(())),
        )
    }

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_insert_creates_snapshot_lazily() {
        let dir = tempdir().unwrap();
        let contacts = collection(dir.path());

        assert_eq!(contacts.count(&Filter::new()).unwrap(), 0);
        assert!(!contacts.path().exists());

        contacts.insert(doc(json!({"id": "a"}))).unwrap();
        assert!(contacts.path().exists());
    }

    #[test]
    fn test_update_without_match_does_not_write() {
        let dir = tempdir().unwrap();
        let contacts = collection(dir.path());

        let result = contacts
            .update_one(&Filter::by_id("x"), &Update::new().set("read", true), false)
            .unwrap();

        assert_eq!(result, UpdateResult::default());
        assert!(!contacts.path().exists());
    }

    #[test]
    fn test_modify_one_error_leaves_snapshot_untouched() {
        let dir = tempdir().unwrap();
        let contacts = collection(dir.path());
        contacts.insert(doc(json!({"id": "a", "read": false}))).unwrap();

        let result: Result<Option<()>> = contacts.modify_one(&Filter::by_id("a"), |record| {
            record.insert("read".to_string(), json!(true));
            Err(FolioError::InvalidInput("rejected".to_string()))
        });

        assert!(matches!(result, Err(FolioError::InvalidInput(_))));
        let stored = contacts.find_one(&Filter::by_id("a")).unwrap().unwrap();
        assert_eq!(stored["read"], json!(false));
    }

    #[test]
    fn test_modify_one_without_match_is_none() {
        let dir = tempdir().unwrap();
        let contacts = collection(dir.path());

        let outcome = contacts
            .modify_one(&Filter::by_id("missing"), |_| Ok(1))
            .unwrap();

        assert_eq!(outcome, None);
        assert!(!contacts.path().exists());
    }

    #[test]
    fn test_insert_unless_exists() {
        let dir = tempdir().unwrap();
        let contacts = collection(dir.path());
        let filter = Filter::new().eq("email", "a@example.com");

        let first = doc(json!({"id": "1", "email": "a@example.com"}));
        let second = doc(json!({"id": "2", "email": "a@example.com"}));
        assert!(contacts.insert_unless_exists(&filter, first).unwrap());
        assert!(!contacts.insert_unless_exists(&filter, second).unwrap());
        assert_eq!(contacts.count(&Filter::new()).unwrap(), 1);
    }

    #[test]
    fn test_insert_as_rejects_non_objects() {
        let dir = tempdir().unwrap();
        let contacts = collection(dir.path());

        let err = contacts.insert_as(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, FolioError::Validation(_)));
    }

    #[test]
    fn test_find_one_as_reports_schema_mismatch() {
        #[derive(serde::Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            id: String,
            rating: u8,
        }

        let dir = tempdir().unwrap();
        let contacts = collection(dir.path());
        contacts.insert(doc(json!({"id": "a", "rating": "five"}))).unwrap();

        let result = contacts.find_one_as::<Strict>(&Filter::by_id("a"));
        assert!(matches!(result, Err(FolioError::Validation(_))));
    }
}
