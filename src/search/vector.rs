use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A stored vector entry, one per wardrobe item
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VectorEntry {
    item_id: String,
    image_path: String,
    description: String,
    embedding: Vec<f32>,
}

/// In-memory vector index with disk persistence and cosine similarity search.
pub struct VectorStore {
    entries: RwLock<Vec<VectorEntry>>,
    persist_path: std::path::PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorHit {
    pub item_id: String,
    pub image_path: String,
    pub description: String,
    pub score: f32,
}

impl VectorStore {
    pub fn open_or_create(vector_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(vector_dir)?;
        let persist_path = vector_dir.join("vectors.json");

        let entries = if persist_path.exists() {
            let data = std::fs::read_to_string(&persist_path)
                .context("Failed to read vector store")?;
            serde_json::from_str(&data).unwrap_or_else(|e| {
                tracing::warn!("Vector store unreadable, starting empty (re-index items): {e}");
                Vec::new()
            })
        } else {
            Vec::new()
        };

        Ok(Self {
            entries: RwLock::new(entries),
            persist_path,
        })
    }

    /// Add or replace the vector for an item.
    pub fn upsert(
        &self,
        item_id: &str,
        image_path: &str,
        description: &str,
        embedding: Vec<f32>,
    ) -> Result<()> {
        let mut entries = self.entries.write();
        let mut updated: Vec<VectorEntry> = entries
            .iter()
            .filter(|e| e.item_id != item_id)
            .cloned()
            .collect();
        updated.push(VectorEntry {
            item_id: item_id.to_string(),
            image_path: image_path.to_string(),
            description: description.to_string(),
            embedding,
        });
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }

    /// Delete the vector for an item. Returns false if none was stored.
    pub fn delete_item(&self, item_id: &str) -> Result<bool> {
        let mut entries = self.entries.write();
        if !entries.iter().any(|e| e.item_id == item_id) {
            return Ok(false);
        }
        let updated: Vec<VectorEntry> = entries
            .iter()
            .filter(|e| e.item_id != item_id)
            .cloned()
            .collect();
        self.persist(&updated)?;
        *entries = updated;
        Ok(true)
    }

    /// Search by cosine similarity against a query embedding.
    pub fn search(&self, query_embedding: &[f32], limit: usize) -> Vec<VectorHit> {
        let entries = self.entries.read();

        let mut scored: Vec<(f32, &VectorEntry)> = entries
            .iter()
            .map(|e| (cosine_similarity(query_embedding, &e.embedding), e))
            .collect();

        // Sort descending by score
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(score, e)| VectorHit {
                item_id: e.item_id.clone(),
                image_path: e.image_path.clone(),
                description: e.description.clone(),
                score,
            })
            .collect()
    }

    #[cfg(test)]
    fn contains(&self, item_id: &str) -> bool {
        self.entries.read().iter().any(|e| e.item_id == item_id)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }

    fn persist(&self, entries: &[VectorEntry]) -> Result<()> {
        let data = serde_json::to_string(entries)?;
        let tmp_path = self.persist_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, data)?;
        std::fs::rename(&tmp_path, &self.persist_path)?;
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_mismatched_dimensions() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open_or_create(dir.path()).unwrap();
        store.upsert("jeans", "/i/j.jpg", "blue jeans", vec![0.9, 0.1, 0.1]).unwrap();
        store.upsert("blazer", "/i/b.jpg", "navy blazer", vec![0.1, 0.9, 0.2]).unwrap();
        store.upsert("sneaker", "/i/s.jpg", "white sneaker", vec![0.1, 0.2, 0.9]).unwrap();

        let hits = store.search(&[0.2, 0.95, 0.1], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].item_id, "blazer");
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn test_upsert_replaces_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open_or_create(dir.path()).unwrap();
        store.upsert("a", "/i/a.jpg", "old", vec![1.0, 0.0]).unwrap();
        store.upsert("a", "/i/a.jpg", "new", vec![0.0, 1.0]).unwrap();

        assert_eq!(store.entry_count(), 1);
        assert_eq!(store.search(&[0.0, 1.0], 5)[0].description, "new");
    }

    #[test]
    fn test_delete_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = VectorStore::open_or_create(dir.path()).unwrap();
            store.upsert("a", "/i/a.jpg", "a", vec![1.0]).unwrap();
            store.upsert("b", "/i/b.jpg", "b", vec![1.0]).unwrap();
            assert!(store.delete_item("a").unwrap());
            assert!(!store.delete_item("a").unwrap());
        }
        let reopened = VectorStore::open_or_create(dir.path()).unwrap();
        assert_eq!(reopened.entry_count(), 1);
        assert!(reopened.contains("b"));
    }

    #[test]
    fn test_failed_write_leaves_index_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let vector_dir = dir.path().join("vectors");
        let store = VectorStore::open_or_create(&vector_dir).unwrap();
        store.upsert("a", "/i/a.jpg", "a", vec![1.0]).unwrap();

        std::fs::remove_dir_all(&vector_dir).unwrap();
        assert!(store.upsert("ghost", "/i/g.jpg", "g", vec![1.0]).is_err());
        assert!(!store.contains("ghost"));
        assert!(store.delete_item("a").is_err());
        assert!(store.contains("a"));
        assert_eq!(store.entry_count(), 1);
    }
}
