//! File-backed document store.
//!
//! Each collection is persisted as one JSON array on disk. Every mutation
//! loads the whole array, changes it in memory and writes the whole array
//! back through an atomic rename, so readers only ever see complete
//! snapshots. Collections are expected to hold hundreds of records, not
//! millions.
//!
//! An unparseable snapshot is read as an empty collection (see
//! [`snapshot::SnapshotLoad::Recovered`]); the next write replaces it.
//!
//! Within one process, writes to the same collection are serialized by a
//! per-collection lock owned by the [`Store`]. Separate processes sharing a
//! store root still race: the last write wins.

mod collection;
mod cursor;
mod registry;
pub mod snapshot;
mod types;

pub use collection::Collection;
pub(crate) use collection::{from_document, to_document};
pub use cursor::Cursor;
pub use registry::{CollectionName, Store};
pub use types::{DeleteResult, Document, Filter, SortOrder, Update, UpdateResult};
