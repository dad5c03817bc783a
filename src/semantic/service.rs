//! High-level semantic retrieval over the restaurant index.
//!
//! Lazily loads the embedding model and vectors.bin on first query, since
//! model initialization is by far the most expensive step of process
//! startup. Thread-safe through interior mutability.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::config::SemanticConfig;
use crate::semantic::embeddings::{model_id_hash, EmbeddingError, FastembedModel, TextEmbedder};
use crate::semantic::index::{IndexError, SearchHit, VectorIndex};
use crate::semantic::storage::{VectorStorage, VectorStorageError};
use crate::semantic::VECTORS_FILE;

/// Errors that can occur during semantic retrieval.
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("storage error: {0}")]
    Storage(#[from] VectorStorageError),

    #[error("no vector index at {0}, run `resto index` first")]
    MissingIndex(PathBuf),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Lazily-loaded retrieval components.
struct SemanticState {
    embedder: Box<dyn TextEmbedder>,
    index: VectorIndex,
}

/// Embedding model + vector index behind one query interface.
pub struct SemanticIndex {
    config: SemanticConfig,
    base_path: PathBuf,
    /// Uses Mutex<Option<_>> instead of OnceLock because
    /// get_or_try_init is unstable.
    state: Mutex<Option<SemanticState>>,
}

impl SemanticIndex {
    /// Create an uninitialized service; the model and index are loaded on
    /// the first query.
    pub fn new(config: SemanticConfig, base_path: PathBuf) -> Self {
        Self {
            config,
            base_path,
            state: Mutex::new(None),
        }
    }

    /// Create a service from pre-built parts, skipping lazy
    /// initialization. Used by tests to inject a stub embedder.
    pub fn with_parts(
        config: SemanticConfig,
        embedder: Box<dyn TextEmbedder>,
        index: VectorIndex,
    ) -> Self {
        Self {
            config,
            base_path: PathBuf::new(),
            state: Mutex::new(Some(SemanticState { embedder, index })),
        }
    }

    /// Embed `text` and return the `limit` most similar catalog ids,
    /// ranked by descending cosine similarity.
    pub fn query(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>, SemanticError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| SemanticError::Internal(format!("lock poisoned: {}", e)))?;

        if guard.is_none() {
            *guard = Some(self.load()?);
        }

        let state = guard
            .as_ref()
            .ok_or_else(|| SemanticError::Internal("state missing after init".to_string()))?;

        let embedding = state.embedder.embed(text)?;
        let hits = state
            .index
            .search(&embedding, self.config.default_threshold, limit)?;

        Ok(hits)
    }

    /// Number of indexed entries, 0 if not yet initialized.
    pub fn indexed_count(&self) -> usize {
        self.state
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.index.len()))
            .unwrap_or(0)
    }

    pub fn is_initialized(&self) -> bool {
        self.state
            .lock()
            .ok()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Load the embedding model and the persisted index.
    ///
    /// The storage file is checked before touching the model so a missing
    /// index fails fast instead of triggering a model download.
    fn load(&self) -> Result<SemanticState, SemanticError> {
        let storage = VectorStorage::new(self.base_path.join(VECTORS_FILE));
        if !storage.exists() {
            return Err(SemanticError::MissingIndex(storage.path().to_path_buf()));
        }

        log::info!(
            "initializing semantic search with model '{}'",
            self.config.model
        );
        let embedder = FastembedModel::new(&self.config.model, self.base_path.clone())?;

        let model_id = model_id_hash(&self.config.model);
        let index = storage.load(&model_id, embedder.dimensions())?;
        log::info!("loaded {} restaurant vectors", index.len());

        Ok(SemanticState {
            embedder: Box::new(embedder),
            index,
        })
    }
}
