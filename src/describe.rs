//! Derived-text generation for the indexing pass.
//!
//! Builds the natural-language `description` and the keyword-dense
//! `search_text` for a restaurant from its dataset fields. Review and tip
//! selection favors quality over quantity: a handful of specific,
//! well-rated reviews embeds better than everything concatenated.
//!
//! Both outputs are projections of the source fields and are regenerated
//! wholesale on every indexing pass, never patched.

use crate::restaurants::{DatasetRecord, Review};

/// Reviews shorter or longer than this word range rarely carry signal.
const REVIEW_WORDS_MIN: usize = 10;
const REVIEW_WORDS_MAX: usize = 50;

/// Boilerplate phrases that mark a review as generic praise.
const GENERIC_PHRASES: &[&str] = &[
    "great place",
    "highly recommend",
    "will be back",
    "love this place",
];

/// Mentions of concrete food or venue features make a review useful.
const FEATURE_KEYWORDS: &[&str] = &[
    "pizza", "pasta", "sauce", "taste", "flavor", "fresh", "spicy", "sweet", "atmosphere",
    "service", "staff", "ambiance", "quiet", "romantic", "family", "kids", "parking", "location",
    "price", "value",
];

/// Food words used to prioritize tips.
const FOOD_KEYWORDS: &[&str] = &[
    "pizza", "coffee", "burger", "salad", "soup", "dessert", "drink",
];

/// Positive sentiment vocabulary counted across well-rated reviews.
const POSITIVE_KEYWORDS: &[&str] = &[
    "delicious", "amazing", "excellent", "perfect", "fresh", "tasty", "flavorful", "crispy",
];

/// The two derived text fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedText {
    pub description: String,
    pub search_text: String,
}

/// Generate `description` and `search_text` for one dataset record.
pub fn generate(record: &DatasetRecord) -> DerivedText {
    let r = &record.restaurant;

    let categories = r.categories.join(", ");
    let location = match (r.city.is_empty(), r.state.is_empty()) {
        (false, false) => format!("{}, {}", r.city, r.state),
        (false, true) => r.city.clone(),
        (true, false) => r.state.clone(),
        (true, true) => String::new(),
    };

    let quality_reviews = select_quality_reviews(&record.reviews, 2);
    let useful_tips = select_useful_tips(&record.tips, 3);
    let sentiment = sentiment_keywords(&record.reviews);

    let mut features: Vec<&str> = Vec::new();
    if r.good_for_kids {
        features.push("family-friendly");
    }
    if r.dogs_allowed {
        features.push("pet-friendly");
    }
    if r.wifi {
        features.push("wifi available");
    }

    let ambiences = r.ambiences.join(", ");

    let mut description_parts: Vec<String> = Vec::new();
    if !r.name.is_empty() {
        description_parts.push(format!("{} is a {} restaurant", r.name, categories));
    }
    if !location.is_empty() {
        description_parts.push(format!("located in {}", location));
    }
    if r.stars > 0.0 && r.review_count > 0 {
        description_parts.push(format!(
            "with {} stars from {} reviews",
            r.stars, r.review_count
        ));
    }
    if !features.is_empty() {
        description_parts.push(format!("featuring {}", features.join(", ")));
    }
    if !ambiences.is_empty() {
        description_parts.push(format!("with {} ambiance", ambiences));
    }
    if !sentiment.is_empty() {
        description_parts.push(format!("known for being {}", sentiment.join(" ")));
    }

    let description = if description_parts.is_empty() {
        String::new()
    } else {
        format!("{}.", description_parts.join(". "))
    };

    let mut search_parts: Vec<String> = vec![r.name.clone(), categories, location];
    if !quality_reviews.is_empty() {
        search_parts.push(quality_reviews.join(" "));
    }
    if !useful_tips.is_empty() {
        search_parts.push(useful_tips.join(" "));
    }
    if !sentiment.is_empty() {
        search_parts.push(sentiment.join(" "));
    }

    let search_text = search_parts
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    DerivedText {
        description,
        search_text,
    }
}

/// Pick up to `limit` well-rated, specific reviews.
///
/// Keeps 4+ star reviews in the useful word range, drops generic praise,
/// then ranks by how many concrete features they mention.
fn select_quality_reviews(reviews: &[Review], limit: usize) -> Vec<String> {
    let mut scored: Vec<(usize, &Review)> = reviews
        .iter()
        .filter(|review| review.stars >= 4.0)
        .filter(|review| {
            let words = review.review.split_whitespace().count();
            (REVIEW_WORDS_MIN..=REVIEW_WORDS_MAX).contains(&words)
        })
        .filter(|review| {
            let text = review.review.to_lowercase();
            !GENERIC_PHRASES.iter().any(|phrase| text.contains(phrase))
        })
        .map(|review| {
            let text = review.review.to_lowercase();
            let score = FEATURE_KEYWORDS
                .iter()
                .filter(|keyword| text.contains(*keyword))
                .count();
            (score, review)
        })
        .collect();

    // Stable sort keeps dataset order between equal scores
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .take(limit)
        .map(|(_, review)| review.review.clone())
        .collect()
}

/// Pick up to `limit` informative tips, food-specific ones first.
fn select_useful_tips(tips: &[String], limit: usize) -> Vec<String> {
    let meaningful: Vec<&String> = tips
        .iter()
        .filter(|tip| tip.split_whitespace().count() >= 3)
        .collect();

    let food_tips: Vec<&String> = meaningful
        .iter()
        .filter(|tip| {
            let text = tip.to_lowercase();
            FOOD_KEYWORDS.iter().any(|food| text.contains(food))
        })
        .copied()
        .collect();

    if food_tips.is_empty() {
        return meaningful
            .into_iter()
            .take(limit)
            .cloned()
            .collect();
    }

    let mut selected: Vec<&String> = food_tips.into_iter().take(3).collect();
    for tip in meaningful.iter().copied() {
        if selected.len() >= limit {
            break;
        }
        if !selected.iter().any(|s| *s == tip) {
            selected.push(tip);
        }
    }

    selected.into_iter().take(limit).cloned().collect()
}

/// Most frequent positive-sentiment words across 4+ star reviews, top 3.
fn sentiment_keywords(reviews: &[Review]) -> Vec<&'static str> {
    let mut counts: Vec<(usize, &'static str)> = POSITIVE_KEYWORDS
        .iter()
        .map(|keyword| {
            let count = reviews
                .iter()
                .filter(|review| review.stars >= 4.0)
                .filter(|review| review.review.to_lowercase().contains(keyword))
                .count();
            (count, *keyword)
        })
        .filter(|(count, _)| *count > 0)
        .collect();

    // Keyword-table order breaks ties so output is deterministic
    counts.sort_by(|a, b| b.0.cmp(&a.0));

    counts
        .into_iter()
        .take(3)
        .map(|(_, keyword)| keyword)
        .collect()
}
