//! Cross-module integration tests driving the full search pipeline and
//! the HTTP layer against a deterministic stub embedder.

mod pipeline;

use crate::config::SemanticConfig;
use crate::restaurants::{Catalog, Restaurant};
use crate::search::SearchService;
use crate::semantic::{EmbeddingError, SemanticIndex, TextEmbedder, VectorIndex};
use crate::translate::QueryNormalizer;

/// Keyword axes of the stub embedding space.
const AXES: &[&str] = &["pizza", "sushi", "coffee"];

/// Maps texts to a 3-dimensional space with one axis per food keyword.
/// Texts mentioning the same keyword land on the same axis, so cosine
/// ranking behaves like a tiny but real semantic model.
struct KeywordEmbedder;

impl TextEmbedder for KeywordEmbedder {
    fn dimensions(&self) -> usize {
        AXES.len()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = text.to_lowercase();
        let vector: Vec<f32> = AXES
            .iter()
            .map(|axis| if text.contains(axis) { 1.0 } else { 0.0 })
            .collect();

        if vector.iter().all(|v| *v == 0.0) {
            return Err(EmbeddingError::EmptyInput);
        }
        Ok(vector)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

fn restaurant(name: &str, categories: &[&str], stars: f32, search_text: &str) -> Restaurant {
    Restaurant {
        id: name.to_lowercase().replace(' ', "-"),
        name: name.to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        city: "Santa Barbara".to_string(),
        stars,
        review_count: 100,
        search_text: search_text.to_string(),
        ..Default::default()
    }
}

/// A search service over `restaurants`, embedded with [`KeywordEmbedder`].
fn stub_service(restaurants: Vec<Restaurant>) -> SearchService {
    let embedder = KeywordEmbedder;
    let mut index = VectorIndex::new(embedder.dimensions());

    for (id, restaurant) in restaurants.iter().enumerate() {
        let embedding = embedder
            .embed(&restaurant.search_text)
            .expect("fixture search_text must hit a keyword axis");
        index.insert(id as u64, 0, embedding).unwrap();
    }

    let config = SemanticConfig {
        default_threshold: 0.0,
        ..Default::default()
    };
    let semantic = SemanticIndex::with_parts(config, Box::new(embedder), index);

    SearchService::new(QueryNormalizer::new(), semantic, Catalog::new(restaurants))
}

/// Pizza place, sushi place, coffee shop.
fn default_fixture() -> SearchService {
    stub_service(vec![
        restaurant(
            "Mario's",
            &["Pizza", "Italian"],
            4.5,
            "Mario's pizza italian wood-fired",
        ),
        restaurant(
            "Sakura",
            &["Sushi Bars", "Japanese"],
            4.0,
            "Sakura sushi fresh fish",
        ),
        restaurant(
            "Daily Grind",
            &["Coffee & Tea"],
            3.5,
            "Daily Grind coffee espresso pastries",
        ),
    ])
}
