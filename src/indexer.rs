//! The offline indexing pass: dataset -> catalog.json + vectors.bin.
//!
//! Descriptions and search texts are regenerated from scratch on every
//! run, but embeddings are reused from the previous vectors.bin whenever
//! a restaurant's search text is unchanged. Re-running over the same
//! dataset is therefore cheap.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::describe;
use crate::restaurants::{Catalog, DatasetRecord};
use crate::search::CATALOG_FILE;
use crate::semantic::{
    content_hash, embed_input, model_id_hash, FastembedModel, TextEmbedder, VectorIndex,
    VectorStorage, VECTORS_FILE,
};

/// Batch size for embedding generation
const EMBED_BATCH_SIZE: usize = 32;

pub fn run(config: &Config, base_path: &Path, dataset_path: &Path) -> anyhow::Result<()> {
    let mut records = load_dataset(dataset_path)?;
    if records.is_empty() {
        bail!("dataset {} contains no restaurants", dataset_path.display());
    }
    log::info!("loaded {} restaurants from dataset", records.len());

    for record in records.iter_mut() {
        let derived = describe::generate(record);
        record.restaurant.description = derived.description;
        record.restaurant.search_text = derived.search_text;
    }

    let model = FastembedModel::new(&config.semantic.model, base_path.to_path_buf())?;
    let model_id = model_id_hash(&config.semantic.model);

    let storage = VectorStorage::new(base_path.join(VECTORS_FILE));
    let previous = load_previous_index(&storage, &model_id, model.dimensions());

    let mut index = VectorIndex::with_capacity(model.dimensions(), records.len());

    // (id, hash, text) of every record whose embedding must be recomputed
    let mut pending: Vec<(u64, u64, String)> = Vec::new();
    let mut reused = 0usize;

    for (id, record) in records.iter().enumerate() {
        let id = id as u64;

        let text = match embed_input(&record.restaurant.search_text) {
            Some(text) => text,
            None => {
                log::warn!(
                    "restaurant {} ({:?}) has no text to embed, skipping",
                    id,
                    record.restaurant.name
                );
                continue;
            }
        };
        let hash = content_hash(&text);

        match previous.as_ref().and_then(|prev| prev.get(id)) {
            Some(entry) if entry.content_hash == hash => {
                index.insert(id, hash, entry.embedding.clone())?;
                reused += 1;
            }
            _ => pending.push((id, hash, text)),
        }
    }

    if reused > 0 {
        log::info!("reusing {} embeddings from the existing index", reused);
    }

    embed_pending(&model, &mut index, &pending)?;

    storage.save(&index, &model_id)?;
    log::info!(
        "wrote {} vectors to {}",
        index.len(),
        storage.path().display()
    );

    let catalog = Catalog::new(records.into_iter().map(|r| r.restaurant).collect());
    let catalog_path = base_path.join(CATALOG_FILE);
    catalog
        .save(&catalog_path)
        .with_context(|| format!("cannot write {}", catalog_path.display()))?;
    log::info!(
        "wrote {} restaurants to {}",
        catalog.len(),
        catalog_path.display()
    );

    Ok(())
}

fn load_dataset(path: &Path) -> anyhow::Result<Vec<DatasetRecord>> {
    let file =
        File::open(path).with_context(|| format!("cannot open dataset {}", path.display()))?;
    let records = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse dataset {}", path.display()))?;
    Ok(records)
}

/// Best effort: a previous index that fails to load (different model,
/// corruption) just means every embedding is recomputed.
fn load_previous_index(
    storage: &VectorStorage,
    model_id: &[u8; 32],
    dimensions: usize,
) -> Option<VectorIndex> {
    if !storage.exists() {
        return None;
    }

    match storage.load(model_id, dimensions) {
        Ok(index) => Some(index),
        Err(err) => {
            log::warn!("existing vector index not reusable: {}", err);
            None
        }
    }
}

fn embed_pending(
    model: &FastembedModel,
    index: &mut VectorIndex,
    pending: &[(u64, u64, String)],
) -> anyhow::Result<()> {
    if pending.is_empty() {
        return Ok(());
    }

    let bar = ProgressBar::new(pending.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("embedding {pos}/{len} [{bar:40}] {eta}")
            .unwrap()
            .progress_chars("=> "),
    );

    for batch in pending.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|(_, _, text)| text.clone()).collect();
        let embeddings = model.embed_batch(&texts)?;

        for ((id, hash, _), embedding) in batch.iter().zip(embeddings) {
            index.insert(*id, *hash, embedding)?;
        }
        bar.inc(batch.len() as u64);
    }
    bar.finish_and_clear();

    Ok(())
}
