//! Embedding providers and the model registry.
//!
//! Providers are resolved by model name once per storage at metadata load;
//! there is no per-call string dispatch on provider kind.

mod http;
mod tfidf;

use std::sync::Arc;

use dashmap::DashMap;

use textsearch_core::traits::IEmbeddingProvider;
use textsearch_core::{TextSearchError, TextSearchResult};

pub use http::HttpProvider;
pub use tfidf::TfIdfProvider;

/// Maps model names to their providers.
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<dyn IEmbeddingProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: DashMap::new(),
        }
    }

    /// Register a provider under its model name. Replaces an existing
    /// registration for the same model.
    pub fn register(&self, provider: Arc<dyn IEmbeddingProvider>) {
        self.providers.insert(provider.model().to_string(), provider);
    }

    /// Resolve the provider for a model.
    pub fn get(&self, model: &str) -> TextSearchResult<Arc<dyn IEmbeddingProvider>> {
        self.providers
            .get(model)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TextSearchError::ConfigurationError {
                message: format!("no provider registered for model '{model}'"),
            })
    }

    /// Registered model names.
    pub fn models(&self) -> Vec<String> {
        self.providers.iter().map(|e| e.key().clone()).collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_resolve() {
        let registry = ProviderRegistry::new();
        registry.register(Arc::new(TfIdfProvider::new("tfidf-64", 64)));

        let provider = registry.get("tfidf-64").unwrap();
        assert_eq!(provider.dimensions(), 64);
    }

    #[test]
    fn unknown_model_is_configuration_error() {
        let registry = ProviderRegistry::new();
        let err = registry.get("missing-model").unwrap_err();
        assert!(matches!(err, TextSearchError::ConfigurationError { .. }));
    }

    #[test]
    fn models_lists_registrations() {
        let registry = ProviderRegistry::new();
        registry.register(Arc::new(TfIdfProvider::new("a", 8)));
        registry.register(Arc::new(TfIdfProvider::new("b", 8)));

        let mut models = registry.models();
        models.sort();
        assert_eq!(models, vec!["a", "b"]);
    }
}
