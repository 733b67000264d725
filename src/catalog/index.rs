//! Nearest-neighbour lookup over entity embeddings

use crate::processing::embeddings::cosine_similarity;
use serde_json::Value;
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub id: String,
    /// Cosine similarity in [-1, 1]
    pub similarity: f32,
    pub metadata: Value,
}

/// Vector index collaborator. The matcher only ever calls `query`;
/// `upsert` belongs to ingestion.
pub trait VectorIndex: Send + Sync {
    /// Up to `top_k` entries nearest to `vector`, most similar first.
    fn query(&self, vector: &[f32], top_k: usize) -> anyhow::Result<Vec<IndexHit>>;

    fn upsert(&self, id: &str, vector: Vec<f32>, metadata: Value) -> anyhow::Result<()>;

    fn len(&self) -> anyhow::Result<usize>;

    fn is_empty(&self) -> anyhow::Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[derive(Debug)]
struct IndexEntry {
    id: String,
    vector: Vec<f32>,
    metadata: Value,
}

/// Brute-force cosine index, adequate for catalogs that fit in memory.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    entries: RwLock<Vec<IndexEntry>>,
    dimension: RwLock<Option<usize>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VectorIndex for InMemoryVectorIndex {
    fn query(&self, vector: &[f32], top_k: usize) -> anyhow::Result<Vec<IndexHit>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("vector index lock poisoned"))?;

        let mut hits = Vec::with_capacity(entries.len());
        for entry in entries.iter() {
            let similarity = cosine_similarity(vector, &entry.vector)?;
            hits.push(IndexHit {
                id: entry.id.clone(),
                similarity,
                metadata: entry.metadata.clone(),
            });
        }

        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(top_k);
        Ok(hits)
    }

    fn upsert(&self, id: &str, vector: Vec<f32>, metadata: Value) -> anyhow::Result<()> {
        {
            let mut dimension = self
                .dimension
                .write()
                .map_err(|_| anyhow::anyhow!("vector index lock poisoned"))?;
            match *dimension {
                Some(expected) if expected != vector.len() => {
                    anyhow::bail!(
                        "vector for {} has {} dimensions, index holds {}",
                        id,
                        vector.len(),
                        expected
                    );
                }
                Some(_) => {}
                None => *dimension = Some(vector.len()),
            }
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("vector index lock poisoned"))?;
        match entries.iter_mut().find(|e| e.id == id) {
            Some(existing) => {
                existing.vector = vector;
                existing.metadata = metadata;
            }
            None => entries.push(IndexEntry {
                id: id.to_string(),
                vector,
                metadata,
            }),
        }
        Ok(())
    }

    fn len(&self) -> anyhow::Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("vector index lock poisoned"))?;
        Ok(entries.len())
    }
}
