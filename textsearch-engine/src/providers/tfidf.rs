//! Deterministic local TF-IDF provider.
//!
//! Hashes terms into fixed-dimension buckets weighted by term frequency.
//! Not as semantically rich as a neural model, but dependency-free and
//! fully deterministic, which makes it the default for tests and
//! air-gapped deployments.

use std::collections::HashMap;

use textsearch_core::traits::IEmbeddingProvider;
use textsearch_core::{DocumentType, TextSearchResult};

pub struct TfIdfProvider {
    model: String,
    dimensions: usize,
}

impl TfIdfProvider {
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model: model.into(),
            dimensions,
        }
    }

    /// Hash a term into a bucket index using FNV-1a.
    fn hash_term(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h as usize) % dims
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.len() >= 2)
            .map(|s| s.to_lowercase())
            .collect()
    }
}

impl IEmbeddingProvider for TfIdfProvider {
    // All task types share one vector space here; the tag only matters
    // to models trained with task-specific prefixes.
    fn embed(&self, content: &str, _document_type: DocumentType) -> TextSearchResult<Vec<f32>> {
        let tokens = Self::tokenize(content);
        if tokens.is_empty() {
            return Ok(vec![0.0; self.dimensions]);
        }

        let mut tf: HashMap<&str, f32> = HashMap::new();
        for tok in &tokens {
            *tf.entry(tok.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        let mut vec = vec![0.0f32; self.dimensions];
        for (term, count) in &tf {
            let freq = count / total;
            // IDF approximation: penalize very short terms (likely stopwords).
            let idf = 1.0 + (term.len() as f32).ln();
            vec[Self::hash_term(term, self.dimensions)] += freq * idf;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }

        Ok(vec)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> TfIdfProvider {
        TfIdfProvider::new("tfidf-128", 128)
    }

    #[test]
    fn produces_configured_dimensions() {
        let vec = provider()
            .embed("the quick brown fox", DocumentType::RetrievalDocument)
            .unwrap();
        assert_eq!(vec.len(), 128);
    }

    #[test]
    fn deterministic_for_identical_content() {
        let p = provider();
        let a = p.embed("same text", DocumentType::RetrievalDocument).unwrap();
        let b = p.embed("same text", DocumentType::RetrievalDocument).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_content_differs() {
        let p = provider();
        let a = p.embed("first text", DocumentType::RetrievalDocument).unwrap();
        let b = p.embed("second text", DocumentType::RetrievalDocument).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn output_is_l2_normalized() {
        let vec = provider()
            .embed("normalize me please", DocumentType::RetrievalDocument)
            .unwrap();
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_content_yields_zero_vector() {
        let vec = provider().embed("", DocumentType::RetrievalDocument).unwrap();
        assert!(vec.iter().all(|x| *x == 0.0));
    }
}
