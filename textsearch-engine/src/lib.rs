//! # textsearch-engine
//!
//! The embedding deduplication engine: content-addressed keys, the
//! single-flight cache-and-compute protocol, the provider registry, and
//! the similarity-search facade over the vector store.

pub mod engine;
pub mod key;
pub mod lock;
pub mod metadata_cache;
pub mod providers;

pub use engine::TextSearchEngine;
pub use lock::LocalLockService;
pub use providers::{HttpProvider, ProviderRegistry, TfIdfProvider};
