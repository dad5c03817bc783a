//! The query-time search pipeline.
//!
//! One search call runs strictly sequentially:
//! normalize -> embed -> retrieve 2x candidates -> filter -> truncate.
//!
//! The over-fetch exists because structured filters are applied
//! client-side after retrieval; fetching only `limit` candidates would
//! starve the result set whenever filters reject hits.
//!
//! Every internal failure (embedding, index, missing data) degrades to an
//! empty result list. The chat layer must always be able to render a
//! normal "no matches" reply, so errors are logged here and never
//! propagated upward.

use std::path::Path;

use crate::config::Config;
use crate::restaurants::{apply_filters, Catalog, ScoredResult, SearchFilters};
use crate::semantic::{SemanticError, SemanticIndex};
use crate::translate::QueryNormalizer;

/// Candidate pool multiplier to leave headroom for post-filtering.
const OVERFETCH_FACTOR: usize = 2;

/// File name of the restaurant catalog, relative to the data dir.
pub const CATALOG_FILE: &str = "catalog.json";

/// Composes the normalizer, the semantic index and the catalog into the
/// search pipeline. Stateless per call; safe to share across sessions.
pub struct SearchService {
    normalizer: QueryNormalizer,
    semantic: SemanticIndex,
    catalog: Catalog,
}

impl SearchService {
    /// Open the service over an indexed data directory.
    ///
    /// The catalog is loaded eagerly (it is small); the embedding model
    /// and vectors load lazily on the first query.
    pub fn open(config: &Config, base_path: &Path) -> anyhow::Result<Self> {
        let catalog_path = base_path.join(CATALOG_FILE);
        let catalog = Catalog::load(&catalog_path).map_err(|err| {
            anyhow::anyhow!(
                "cannot load {}: {} (run `resto index` first)",
                catalog_path.display(),
                err
            )
        })?;
        log::info!("catalog loaded, {} restaurants", catalog.len());

        let semantic = SemanticIndex::new(config.semantic.clone(), base_path.to_path_buf());

        Ok(Self {
            normalizer: QueryNormalizer::new(),
            semantic,
            catalog,
        })
    }

    /// Build a service from pre-built parts (tests).
    pub fn new(normalizer: QueryNormalizer, semantic: SemanticIndex, catalog: Catalog) -> Self {
        Self {
            normalizer,
            semantic,
            catalog,
        }
    }

    /// Search with explicit filters.
    ///
    /// Returns at most `limit` results ranked by similarity. Internal
    /// failures yield an empty list, never an error.
    pub fn search(
        &self,
        query: &str,
        filters: Option<&SearchFilters>,
        limit: usize,
    ) -> Vec<ScoredResult> {
        let normalized = self.normalizer.normalize(query);
        self.run(query, &normalized, filters, limit)
    }

    /// Search with filters derived from the message text itself.
    ///
    /// Preference keywords are detected on the normalized query so Korean
    /// messages benefit from the English expansions.
    pub fn recommend(&self, message: &str, limit: usize) -> Vec<ScoredResult> {
        let normalized = self.normalizer.normalize(message);
        let filters = SearchFilters::from_preferences(&normalized);
        let filters = (!filters.is_empty()).then_some(&filters);
        self.run(message, &normalized, filters, limit)
    }

    fn run(
        &self,
        original: &str,
        normalized: &str,
        filters: Option<&SearchFilters>,
        limit: usize,
    ) -> Vec<ScoredResult> {
        match self.pipeline(normalized, filters, limit) {
            Ok(results) => results,
            Err(err) => {
                log::error!("search failed for query {:?}: {}", original, err);
                Vec::new()
            }
        }
    }

    fn pipeline(
        &self,
        normalized: &str,
        filters: Option<&SearchFilters>,
        limit: usize,
    ) -> Result<Vec<ScoredResult>, SemanticError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let pool = limit.saturating_mul(OVERFETCH_FACTOR);
        let hits = self.semantic.query(normalized, pool)?;

        let mut candidates: Vec<ScoredResult> = hits
            .into_iter()
            .filter_map(|hit| match self.catalog.get(hit.id) {
                Some(restaurant) => Some(ScoredResult {
                    restaurant: restaurant.clone(),
                    score: hit.score,
                }),
                None => {
                    // Index and catalog out of sync; reindex fixes it
                    log::warn!("vector hit {} has no catalog entry", hit.id);
                    None
                }
            })
            .collect();

        if let Some(filters) = filters {
            candidates = apply_filters(candidates, filters);
        }

        candidates.truncate(limit);
        Ok(candidates)
    }
}
