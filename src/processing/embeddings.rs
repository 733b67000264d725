//! Embedding provider seam and vector similarity helpers

use crate::error::{Result, TalentMatcherError};
use model2vec_rs::model::StaticModel;
use std::path::Path;
use std::time::Instant;

/// Text-to-vector capability. Must be deterministic for identical input
/// within one model version.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}

/// Embed `text`, attributing any provider failure to `target`.
pub fn embed_for(embedder: &dyn Embedder, text: &str, target: &str) -> Result<Vec<f32>> {
    embedder
        .embed(text)
        .map_err(|e| TalentMatcherError::dependency("embed", target, e))
}

/// Reject a vector that does not live in the embedder's space.
pub fn check_dimension(embedder: &dyn Embedder, vector: &[f32]) -> Result<()> {
    let expected = embedder.dimension();
    if vector.len() != expected {
        return Err(TalentMatcherError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

/// Model2Vec static embeddings
pub struct Model2VecEmbedder {
    model: StaticModel,
    model_name: String,
    dimension: usize,
}

impl Model2VecEmbedder {
    /// Load from a local model directory or a Hugging Face repo id.
    pub fn load(location: &Path, model_name: &str) -> Result<Self> {
        let start_time = Instant::now();
        log::info!("Loading Model2Vec embedding model from: {}", location.display());

        let model = StaticModel::from_pretrained(location, None, None, None)
            .map_err(|e| TalentMatcherError::dependency("embedder.load", model_name, e))?;
        let dimension = model.encode_single("dimension check").len();

        log::info!("Model loaded in {:.2?} ({} dimensions)", start_time.elapsed(), dimension);

        Ok(Self {
            model,
            model_name: model_name.to_string(),
            dimension,
        })
    }
}

impl Embedder for Model2VecEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self.model.encode_single(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Cosine similarity in [-1, 1]. A zero vector is similar to nothing.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(TalentMatcherError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Map a cosine similarity from [-1, 1] onto [0, 1].
pub fn rescale_similarity(cosine: f32) -> f32 {
    if cosine.is_nan() {
        return 0.0;
    }
    ((cosine.clamp(-1.0, 1.0) + 1.0) / 2.0).clamp(0.0, 1.0)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// Fixed text-to-vector table; unknown texts fail like a broken provider.
    pub struct FixedEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        dimension: usize,
    }

    impl FixedEmbedder {
        pub fn new(dimension: usize) -> Self {
            Self {
                vectors: HashMap::new(),
                dimension,
            }
        }

        pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
            self.vectors.insert(text.to_string(), vector);
            self
        }
    }

    impl Embedder for FixedEmbedder {
        fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no vector for {:?}", text))
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }
}
