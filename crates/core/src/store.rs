//! Persistence of named slide sets and groups.
//!
//! Storage is an injected key-value interface: the host platform supplies
//! the actual blob store (app-local storage, a directory of files, an
//! in-memory map in tests), and [`SlideLibrary`] layers the named records on
//! top. Documents are versioned JSON; a version mismatch on load is an
//! error, never silently coerced.

use crate::error::{Error, Result};
use crate::types::{SavedSlideSet, Slide, SlideGroup};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage key for the flat list of saved slide sets.
pub const SLIDE_SETS_KEY: &str = "singleSlides";

/// Storage key for the list of slide groups.
pub const GROUPS_KEY: &str = "slideGroups";

/// Version of the stored document schema.
pub const SCHEMA_VERSION: u32 = 1;

/// A process-wide named-blob store keyed by string.
pub trait BlobStore {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous blob.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete the blob under `key`. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory blob store for tests and previews.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.blobs.remove(key);
        Ok(())
    }
}

/// Versioned envelope around a stored record list.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDocument<T> {
    schema_version: u32,
    items: Vec<T>,
}

/// Named slide-set and group records layered over a [`BlobStore`].
#[derive(Debug)]
pub struct SlideLibrary<S: BlobStore> {
    store: S,
}

impl<S: BlobStore> SlideLibrary<S> {
    /// Create a library over the given blob store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the library, returning the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };
        let doc: StoredDocument<T> = serde_json::from_str(&raw)
            .map_err(|e| Error::Storage(format!("invalid document under '{}': {}", key, e)))?;
        if doc.schema_version != SCHEMA_VERSION {
            return Err(Error::Storage(format!(
                "unsupported schema version {} under '{}' (expected {})",
                doc.schema_version, key, SCHEMA_VERSION
            )));
        }
        Ok(doc.items)
    }

    fn save<T: Serialize>(&mut self, key: &str, items: Vec<T>) -> Result<()> {
        let doc = StoredDocument {
            schema_version: SCHEMA_VERSION,
            items,
        };
        let raw = serde_json::to_string(&doc)
            .map_err(|e| Error::Storage(format!("failed to serialize '{}': {}", key, e)))?;
        self.store.set(key, &raw)
    }

    /// All saved slide sets, in save order.
    pub fn slide_sets(&self) -> Result<Vec<SavedSlideSet>> {
        self.load(SLIDE_SETS_KEY)
    }

    /// Persist a slide sequence under a new name. Returns the saved record.
    pub fn save_slide_set(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        slides: Vec<Slide>,
        created_at: impl Into<String>,
    ) -> Result<SavedSlideSet> {
        let set = SavedSlideSet {
            id: id.into(),
            name: name.into(),
            content: slides,
            created_at: created_at.into(),
        };
        let mut sets = self.slide_sets()?;
        sets.retain(|s| s.id != set.id);
        sets.push(set.clone());
        self.save(SLIDE_SETS_KEY, sets)?;
        log::debug!("Saved slide set '{}' ({} slides)", set.name, set.content.len());
        Ok(set)
    }

    /// Rename a saved slide set.
    pub fn rename_slide_set(&mut self, id: &str, new_name: &str) -> Result<()> {
        let mut sets = self.slide_sets()?;
        let set = sets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::Storage(format!("no slide set with id '{}'", id)))?;
        set.name = new_name.to_string();
        self.save(SLIDE_SETS_KEY, sets)
    }

    /// Delete a saved slide set. Deleting a missing id is not an error.
    pub fn delete_slide_set(&mut self, id: &str) -> Result<()> {
        let mut sets = self.slide_sets()?;
        sets.retain(|s| s.id != id);
        self.save(SLIDE_SETS_KEY, sets)
    }

    /// All groups, in creation order.
    pub fn groups(&self) -> Result<Vec<SlideGroup>> {
        self.load(GROUPS_KEY)
    }

    /// Create an empty group. Returns the new record.
    pub fn create_group(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Result<SlideGroup> {
        let group = SlideGroup {
            id: id.into(),
            name: name.into(),
            slides: Vec::new(),
            created_at: created_at.into(),
            is_favorite: false,
        };
        let mut groups = self.groups()?;
        groups.retain(|g| g.id != group.id);
        groups.push(group.clone());
        self.save(GROUPS_KEY, groups)?;
        Ok(group)
    }

    /// Add a saved slide set to a group, replacing any member with the same id.
    pub fn add_to_group(&mut self, group_id: &str, set: SavedSlideSet) -> Result<()> {
        self.update_group(group_id, |group| {
            group.slides.retain(|s| s.id != set.id);
            group.slides.push(set);
        })
    }

    /// Rename a group.
    pub fn rename_group(&mut self, group_id: &str, new_name: &str) -> Result<()> {
        self.update_group(group_id, |group| group.name = new_name.to_string())
    }

    /// Flip a group's favorite flag. Returns the new value.
    pub fn toggle_favorite(&mut self, group_id: &str) -> Result<bool> {
        let mut favorite = false;
        self.update_group(group_id, |group| {
            group.is_favorite = !group.is_favorite;
            favorite = group.is_favorite;
        })?;
        Ok(favorite)
    }

    /// Delete a group. Deleting a missing id is not an error.
    pub fn delete_group(&mut self, group_id: &str) -> Result<()> {
        let mut groups = self.groups()?;
        groups.retain(|g| g.id != group_id);
        self.save(GROUPS_KEY, groups)
    }

    fn update_group(&mut self, group_id: &str, apply: impl FnOnce(&mut SlideGroup)) -> Result<()> {
        let mut groups = self.groups()?;
        let group = groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| Error::Storage(format!("no group with id '{}'", group_id)))?;
        apply(group);
        self.save(GROUPS_KEY, groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NO_IMAGE;

    fn sample_slides() -> Vec<Slide> {
        vec![Slide {
            id: "slide-1".to_string(),
            image: NO_IMAGE.to_string(),
            text: "Hello".to_string(),
            highlighted: String::new(),
            style: "normal".to_string(),
            background_voice: String::new(),
        }]
    }

    fn library() -> SlideLibrary<MemoryStore> {
        SlideLibrary::new(MemoryStore::new())
    }

    #[test]
    fn empty_library_lists_nothing() {
        let lib = library();
        assert!(lib.slide_sets().unwrap().is_empty());
        assert!(lib.groups().unwrap().is_empty());
    }

    #[test]
    fn save_and_list_slide_sets() {
        let mut lib = library();
        lib.save_slide_set("set-1", "Week 1", sample_slides(), "2024-01-01T00:00:00Z")
            .unwrap();

        let sets = lib.slide_sets().unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "Week 1");
        assert_eq!(sets[0].content, sample_slides());
    }

    #[test]
    fn saving_same_id_replaces() {
        let mut lib = library();
        lib.save_slide_set("set-1", "Old", sample_slides(), "2024-01-01")
            .unwrap();
        lib.save_slide_set("set-1", "New", Vec::new(), "2024-01-02")
            .unwrap();

        let sets = lib.slide_sets().unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "New");
        assert!(sets[0].content.is_empty());
    }

    #[test]
    fn rename_and_delete_slide_set() {
        let mut lib = library();
        lib.save_slide_set("set-1", "Week 1", sample_slides(), "2024-01-01")
            .unwrap();

        lib.rename_slide_set("set-1", "Week One").unwrap();
        assert_eq!(lib.slide_sets().unwrap()[0].name, "Week One");

        lib.delete_slide_set("set-1").unwrap();
        assert!(lib.slide_sets().unwrap().is_empty());
    }

    #[test]
    fn rename_missing_set_is_storage_error() {
        let mut lib = library();
        let err = lib.rename_slide_set("nope", "Name").unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn group_lifecycle() {
        let mut lib = library();
        let set = lib
            .save_slide_set("set-1", "Week 1", sample_slides(), "2024-01-01")
            .unwrap();
        lib.create_group("g-1", "January", "2024-01-01").unwrap();

        lib.add_to_group("g-1", set).unwrap();
        lib.rename_group("g-1", "Jan").unwrap();
        assert!(lib.toggle_favorite("g-1").unwrap());
        assert!(!lib.toggle_favorite("g-1").unwrap());

        let groups = lib.groups().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Jan");
        assert_eq!(groups[0].slides.len(), 1);

        lib.delete_group("g-1").unwrap();
        assert!(lib.groups().unwrap().is_empty());
    }

    #[test]
    fn schema_version_mismatch_is_rejected() {
        let mut store = MemoryStore::new();
        store
            .set(SLIDE_SETS_KEY, r#"{"schemaVersion":99,"items":[]}"#)
            .unwrap();
        let lib = SlideLibrary::new(store);

        let err = lib.slide_sets().unwrap_err();
        match err {
            Error::Storage(msg) => assert!(msg.contains("schema version 99")),
            other => panic!("expected Storage, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_document_is_rejected() {
        let mut store = MemoryStore::new();
        store.set(GROUPS_KEY, "not json").unwrap();
        let lib = SlideLibrary::new(store);

        assert!(matches!(lib.groups().unwrap_err(), Error::Storage(_)));
    }
}
