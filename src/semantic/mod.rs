//! Semantic retrieval infrastructure for restaurant search.
//!
//! Local embeddings via fastembed plus an in-memory cosine similarity
//! index, persisted as a binary vectors file next to the catalog.
//!
//! # Architecture
//!
//! - `embeddings`: the [`TextEmbedder`] trait and the fastembed model
//! - `index`: in-memory vector index with cosine similarity search
//! - `storage`: vectors.bin file I/O
//! - `service`: lazily-initialized query interface used by search

pub mod embeddings;
mod index;
mod service;
mod storage;

pub use embeddings::{model_id_hash, EmbeddingError, FastembedModel, TextEmbedder};
pub use index::{IndexError, SearchHit, VectorIndex};
pub use service::{SemanticError, SemanticIndex};
pub use storage::{VectorStorage, VectorStorageError};

/// File name of the persisted vector index, relative to the data dir.
pub const VECTORS_FILE: &str = "vectors.bin";

/// Maximum embedding input length (characters, not tokens)
const MAX_EMBED_CHARS: usize = 512;

/// Ellipsis suffix when input is truncated
const TRUNCATION_SUFFIX: &str = "...";

/// Prepare a search text for embedding: trim and truncate.
///
/// Returns `None` when the text is empty after trimming.
pub fn embed_input(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.chars().count() <= MAX_EMBED_CHARS {
        return Some(text.to_string());
    }

    let truncated: String = text
        .chars()
        .take(MAX_EMBED_CHARS - TRUNCATION_SUFFIX.len())
        .collect();
    Some(format!("{}{}", truncated, TRUNCATION_SUFFIX))
}

/// Hash of the embedded text, stored alongside each vector so unchanged
/// restaurants keep their embeddings across indexing runs.
pub fn content_hash(text: &str) -> u64 {
    use std::hash::{Hash, Hasher};

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    text.trim().hash(&mut hasher);
    hasher.finish()
}
