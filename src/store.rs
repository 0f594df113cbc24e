//! Item store: tagged garments persisted as one JSON document.

use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};

use crate::models::ClothingItem;

/// Document store keyed by item id, kept in memory and written through to
/// disk on every change. The in-memory view only changes once the write
/// has succeeded.
pub struct ItemStore {
    items: RwLock<Vec<ClothingItem>>,
    persist_path: PathBuf,
}

impl ItemStore {
    pub fn open_or_create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let items = if path.exists() {
            let data = std::fs::read_to_string(path).context("Failed to read item store")?;
            serde_json::from_str(&data)
                .with_context(|| format!("Item store {} is corrupt", path.display()))?
        } else {
            Vec::new()
        };

        Ok(Self {
            items: RwLock::new(items),
            persist_path: path.to_path_buf(),
        })
    }

    /// Insert an item, replacing any existing item with the same id.
    pub fn insert(&self, item: ClothingItem) -> Result<()> {
        let mut items = self.items.write();
        let mut updated = items.clone();
        match updated.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => updated.push(item),
        }
        self.persist(&updated)?;
        *items = updated;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<ClothingItem> {
        self.items.read().iter().find(|i| i.id == id).cloned()
    }

    /// Look up several ids at once. Order follows `ids`; unknown ids yield `None`.
    pub fn get_many(&self, ids: &[String]) -> Vec<Option<ClothingItem>> {
        let items = self.items.read();
        ids.iter()
            .map(|id| items.iter().find(|i| &i.id == id).cloned())
            .collect()
    }

    pub fn list(&self) -> Vec<ClothingItem> {
        self.items.read().clone()
    }

    /// Remove an item. Returns false if it did not exist.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut items = self.items.write();
        if !items.iter().any(|i| i.id == id) {
            return Ok(false);
        }
        let updated: Vec<ClothingItem> = items.iter().filter(|i| i.id != id).cloned().collect();
        self.persist(&updated)?;
        *items = updated;
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Atomic write via temp file + rename.
    fn persist(&self, items: &[ClothingItem]) -> Result<()> {
        let data = serde_json::to_string_pretty(items)?;
        let tmp_path = self.persist_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, data).context("Failed to write item store")?;
        std::fs::rename(&tmp_path, &self.persist_path).context("Failed to replace item store")?;
        Ok(())
    }
}
