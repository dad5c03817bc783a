//! Restaurant records, the on-disk catalog and structured search filters.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A restaurant as stored in the catalog and returned from search.
///
/// `description` and `search_text` are derived projections of the other
/// fields, regenerated in full on every indexing pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Restaurant {
    #[serde(default, alias = "restaurant_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub stars: f32,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub good_for_kids: bool,
    #[serde(default)]
    pub dogs_allowed: bool,
    #[serde(default)]
    pub wifi: bool,
    #[serde(default)]
    pub ambiences: Vec<String>,
    #[serde(default)]
    pub good_for_meals: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub search_text: String,
}

/// A single user review from the raw dataset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub stars: f32,
    #[serde(default)]
    pub review: String,
}

/// A raw dataset row: catalog fields plus the free-text review material
/// that is only consumed while synthesizing `description`/`search_text`.
/// Reviews and tips are never persisted to the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetRecord {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub tips: Vec<String>,
}

/// Position-indexed payload store for the vector index.
///
/// The numeric id of a restaurant is its position in the catalog, matching
/// the ids stored in vectors.bin. Built once by the indexing pass and
/// immutable for the lifetime of a server process.
#[derive(Debug, Default)]
pub struct Catalog {
    restaurants: Vec<Restaurant>,
}

impl Catalog {
    pub fn new(restaurants: Vec<Restaurant>) -> Self {
        Self { restaurants }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        let restaurants: Vec<Restaurant> = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self { restaurants })
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.restaurants)?;
        Ok(())
    }

    pub fn get(&self, id: u64) -> Option<&Restaurant> {
        self.restaurants.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &Restaurant)> {
        self.restaurants
            .iter()
            .enumerate()
            .map(|(id, r)| (id as u64, r))
    }
}

/// A search candidate with its cosine similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredResult {
    pub restaurant: Restaurant,
    pub score: f32,
}

/// Structured post-filters applied to the ranked candidate list.
///
/// Every field is independently optional; an unset field imposes no
/// constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    pub location: Option<String>,
    pub categories: Option<Vec<String>>,
    pub min_stars: Option<f32>,
    pub good_for_kids: Option<bool>,
    pub dogs_allowed: Option<bool>,
}

/// Keyword -> categories table for best-effort preference parsing.
/// First match wins.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("italian", &["Italian"]),
    ("pizza", &["Pizza", "Italian"]),
    ("chinese", &["Chinese"]),
    ("thai", &["Thai"]),
    ("mexican", &["Mexican"]),
    ("coffee", &["Coffee & Tea"]),
    ("breakfast", &["Breakfast & Brunch"]),
    ("lunch", &["Sandwiches", "American (Traditional)"]),
    ("dinner", &["American (New)", "Italian"]),
    ("bar", &["Bars", "Wine Bars"]),
    ("fast food", &["Fast Food"]),
    ("seafood", &["Seafood"]),
];

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.categories.is_none()
            && self.min_stars.is_none()
            && self.good_for_kids.is_none()
            && self.dogs_allowed.is_none()
    }

    /// Best-effort keyword detection over free-text preferences.
    ///
    /// Works on English keywords, so callers should pass text that already
    /// went through query normalization when the input may be Korean.
    pub fn from_preferences(text: &str) -> Self {
        let text = text.to_lowercase();
        let mut filters = Self::default();

        for (keyword, categories) in CATEGORY_KEYWORDS {
            if text.contains(keyword) {
                filters.categories =
                    Some(categories.iter().map(|c| c.to_string()).collect());
                break;
            }
        }

        if text.contains("4 star") || text.contains("high rating") {
            filters.min_stars = Some(4.0);
        } else if text.contains("3 star") || text.contains("good rating") {
            filters.min_stars = Some(3.0);
        }

        if text.contains("family") || text.contains("kids") {
            filters.good_for_kids = Some(true);
        }

        if text.contains("dog") || text.contains("pet") {
            filters.dogs_allowed = Some(true);
        }

        filters
    }

    /// Evaluate this filter set against one restaurant.
    ///
    /// Location is a case-insensitive substring match on the city.
    /// Categories match if any requested category is present
    /// (case-insensitive). Boolean flags require exact equality. Missing
    /// candidate fields evaluate as their empty defaults and so fail any
    /// set constraint.
    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        if let Some(location) = &self.location {
            if !restaurant
                .city
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }

        if let Some(min_stars) = self.min_stars {
            if restaurant.stars < min_stars {
                return false;
            }
        }

        if let Some(categories) = &self.categories {
            let any_match = categories.iter().any(|wanted| {
                restaurant
                    .categories
                    .iter()
                    .any(|have| have.eq_ignore_ascii_case(wanted))
            });
            if !any_match {
                return false;
            }
        }

        if let Some(good_for_kids) = self.good_for_kids {
            if restaurant.good_for_kids != good_for_kids {
                return false;
            }
        }

        if let Some(dogs_allowed) = self.dogs_allowed {
            if restaurant.dogs_allowed != dogs_allowed {
                return false;
            }
        }

        true
    }
}

/// Order-preserving filter pass over ranked candidates.
pub fn apply_filters(candidates: Vec<ScoredResult>, filters: &SearchFilters) -> Vec<ScoredResult> {
    candidates
        .into_iter()
        .filter(|candidate| filters.matches(&candidate.restaurant))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restaurant(name: &str, stars: f32) -> Restaurant {
        Restaurant {
            id: name.to_lowercase(),
            name: name.to_string(),
            stars,
            ..Default::default()
        }
    }

    fn scored(restaurant: Restaurant, score: f32) -> ScoredResult {
        ScoredResult { restaurant, score }
    }

    #[test]
    fn test_empty_filters_keep_everything() {
        let candidates = vec![
            scored(restaurant("A", 4.5), 0.9),
            scored(restaurant("B", 2.0), 0.8),
        ];
        let filters = SearchFilters::default();
        assert!(filters.is_empty());
        let kept = apply_filters(candidates, &filters);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_min_stars_order_preserved() {
        let candidates = vec![
            scored(restaurant("A", 4.5), 0.9),
            scored(restaurant("B", 3.0), 0.8),
            scored(restaurant("C", 5.0), 0.7),
        ];
        let filters = SearchFilters {
            min_stars: Some(4.0),
            ..Default::default()
        };
        let kept = apply_filters(candidates, &filters);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].restaurant.stars, 4.5);
        assert_eq!(kept[1].restaurant.stars, 5.0);
    }

    #[test]
    fn test_filters_never_grow_result() {
        let candidates = vec![
            scored(restaurant("A", 4.5), 0.9),
            scored(restaurant("B", 3.0), 0.8),
        ];
        let total = candidates.len();
        let filters = SearchFilters {
            min_stars: Some(0.0),
            good_for_kids: Some(false),
            ..Default::default()
        };
        assert!(apply_filters(candidates, &filters).len() <= total);
    }

    #[test]
    fn test_location_substring_case_insensitive() {
        let mut r = restaurant("A", 4.0);
        r.city = "Santa Barbara".to_string();
        let filters = SearchFilters {
            location: Some("santa".to_string()),
            ..Default::default()
        };
        assert!(filters.matches(&r));

        let miss = SearchFilters {
            location: Some("Goleta".to_string()),
            ..Default::default()
        };
        assert!(!miss.matches(&r));
    }

    #[test]
    fn test_categories_match_any() {
        let mut r = restaurant("A", 4.0);
        r.categories = vec!["Pizza".to_string(), "Italian".to_string()];
        let filters = SearchFilters {
            categories: Some(vec!["Sushi Bars".to_string(), "pizza".to_string()]),
            ..Default::default()
        };
        assert!(filters.matches(&r));

        let miss = SearchFilters {
            categories: Some(vec!["Thai".to_string()]),
            ..Default::default()
        };
        assert!(!miss.matches(&r));
    }

    #[test]
    fn test_boolean_flags_require_exact_equality() {
        let mut r = restaurant("A", 4.0);
        r.good_for_kids = true;
        r.dogs_allowed = false;

        let want_kids = SearchFilters {
            good_for_kids: Some(true),
            ..Default::default()
        };
        assert!(want_kids.matches(&r));

        // A set `false` must match exactly false, not "anything"
        let no_kids = SearchFilters {
            good_for_kids: Some(false),
            ..Default::default()
        };
        assert!(!no_kids.matches(&r));

        let no_dogs = SearchFilters {
            dogs_allowed: Some(false),
            ..Default::default()
        };
        assert!(no_dogs.matches(&r));
    }

    #[test]
    fn test_defaulted_fields_fail_set_constraints() {
        // Candidate with everything missing: empty city, 0 stars, false flags
        let r = Restaurant::default();
        let filters = SearchFilters {
            location: Some("Santa Barbara".to_string()),
            ..Default::default()
        };
        assert!(!filters.matches(&r));

        let stars = SearchFilters {
            min_stars: Some(1.0),
            ..Default::default()
        };
        assert!(!stars.matches(&r));
    }

    #[test]
    fn test_preferences_category_first_match_wins() {
        // "pizza" appears before "dinner" in the table
        let filters = SearchFilters::from_preferences("Pizza for dinner");
        assert_eq!(
            filters.categories,
            Some(vec!["Pizza".to_string(), "Italian".to_string()])
        );
    }

    #[test]
    fn test_preferences_rating_and_flags() {
        let filters =
            SearchFilters::from_preferences("high rating family place where dogs are welcome");
        assert_eq!(filters.min_stars, Some(4.0));
        assert_eq!(filters.good_for_kids, Some(true));
        assert_eq!(filters.dogs_allowed, Some(true));
        assert!(filters.categories.is_none());
    }

    #[test]
    fn test_preferences_nothing_detected() {
        let filters = SearchFilters::from_preferences("somewhere nice");
        assert!(filters.is_empty());
    }

    #[test]
    fn test_catalog_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let catalog = Catalog::new(vec![restaurant("A", 4.5), restaurant("B", 3.0)]);
        catalog.save(&path).unwrap();

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(0).unwrap().name, "A");
        assert_eq!(loaded.get(1).unwrap().name, "B");
        assert!(loaded.get(2).is_none());
    }

    #[test]
    fn test_dataset_record_parses_payload_aliases() {
        let json = r#"{
            "restaurant_id": "r1",
            "name": "Mario's",
            "categories": ["Pizza"],
            "stars": 4.5,
            "review_count": 120,
            "reviews": [{"stars": 5.0, "review": "great thin crust"}],
            "tips": ["try the margherita"]
        }"#;
        let record: DatasetRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.restaurant.id, "r1");
        assert_eq!(record.restaurant.review_count, 120);
        assert_eq!(record.reviews.len(), 1);
        assert_eq!(record.tips.len(), 1);
    }
}
