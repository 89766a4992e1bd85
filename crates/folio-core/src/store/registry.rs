//! The store root and its named collections.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::collection::Collection;
use crate::error::{FolioError, Result};
use crate::models::Record;

const SNAPSHOT_EXTENSION: &str = "json";

/// Collections used by the portfolio backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionName {
    Admins,
    Services,
    Projects,
    Testimonials,
    Blogs,
    Contacts,
    Profiles,
    MediaSettings,
    SiteSettings,
    Offers,
    HeroSection,
}

impl CollectionName {
    pub const ALL: [CollectionName; 11] = [
        CollectionName::Admins,
        CollectionName::Services,
        CollectionName::Projects,
        CollectionName::Testimonials,
        CollectionName::Blogs,
        CollectionName::Contacts,
        CollectionName::Profiles,
        CollectionName::MediaSettings,
        CollectionName::SiteSettings,
        CollectionName::Offers,
        CollectionName::HeroSection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionName::Admins => "admins",
            CollectionName::Services => "services",
            CollectionName::Projects => "projects",
            CollectionName::Testimonials => "testimonials",
            CollectionName::Blogs => "blogs",
            CollectionName::Contacts => "contacts",
            CollectionName::Profiles => "profiles",
            CollectionName::MediaSettings => "media_settings",
            CollectionName::SiteSettings => "site_settings",
            CollectionName::Offers => "offers",
            CollectionName::HeroSection => "hero_section",
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry of collections under one root directory.
///
/// Construct it once at startup and hand clones to every component that
/// needs storage. Clones share the per-collection writer locks.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
    write_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl Store {
    /// Open (creating if needed) the store root directory.
    ///
    /// Collection files are created on their first write.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            FolioError::Storage(format!(
                "Failed to create store directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self {
            root,
            write_locks: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a collection by name.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::InvalidInput` if the name is empty or contains
    /// characters other than ASCII alphanumerics, `_` and `-`.
    pub fn collection(&self, name: &str) -> Result<Collection> {
        validate_collection_name(name)?;
        Ok(self.handle(name))
    }

    /// Look up one of the backend's own collections.
    pub fn get(&self, name: CollectionName) -> Collection {
        self.handle(name.as_str())
    }

    /// The collection holding records of type `T`.
    pub fn records<T: Record>(&self) -> Collection {
        self.get(T::COLLECTION)
    }

    fn handle(&self, name: &str) -> Collection {
        let lock = {
            let mut locks = self
                .write_locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.entry(name.to_string()).or_default().clone()
        };
        let path = self
            .root
            .join(format!("{}.{}", name, SNAPSHOT_EXTENSION));
        Collection::new(name.to_string(), path, lock)
    }

    /// Names of the collections that have a snapshot on disk, sorted.
    pub fn collection_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if validate_collection_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

fn validate_collection_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FolioError::InvalidInput(
            "Collection name cannot be empty".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(FolioError::InvalidInput(format!(
            "Collection name contains invalid characters: {}",
            name
        )));
    }
    Ok(())
}
