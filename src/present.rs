//! Chat presentation of ranked search results.
//!
//! The chat front end renders a flat list of typed display items: plain
//! messages and restaurant option cards. This module is the only place
//! that knows the wire shape.

use serde::{Deserialize, Serialize};

use crate::restaurants::{Restaurant, ScoredResult};

/// Reply when a search produced no usable results (including internal
/// failures, which degrade to an empty result list upstream).
pub const NO_MATCH_TEXT: &str = "죄송합니다. 조건에 맞는 레스토랑을 찾을 수 없습니다.";

/// One item of a chat reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DisplayItem {
    #[serde(rename = "Message")]
    Message { text: String },

    #[serde(rename = "Restaurant Option")]
    RestaurantOption {
        title: String,
        id: String,
        description: String,
    },
}

impl DisplayItem {
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into() }
    }
}

/// Map ranked results into display items.
///
/// Empty input yields exactly one "no matches" message; otherwise one
/// intro message stating the count followed by one option card per
/// result. Total and infallible.
pub fn present(results: &[ScoredResult]) -> Vec<DisplayItem> {
    if results.is_empty() {
        return vec![DisplayItem::message(NO_MATCH_TEXT)];
    }

    let mut items = Vec::with_capacity(results.len() + 1);
    items.push(DisplayItem::message(format!(
        "추천 레스토랑 {}곳을 찾았습니다:",
        results.len()
    )));

    for result in results {
        let restaurant = &result.restaurant;
        items.push(DisplayItem::RestaurantOption {
            title: restaurant.name.clone(),
            id: restaurant.id.clone(),
            description: card_description(restaurant),
        });
    }

    items
}

/// `"<categories> · ⭐<stars> (<review_count>개 리뷰)[ · <address>, <city>]"`,
/// the address suffix only when both address and city are present.
fn card_description(restaurant: &Restaurant) -> String {
    let categories = restaurant.categories.join(", ");
    let mut description = format!(
        "{} · ⭐{} ({}개 리뷰)",
        categories, restaurant.stars, restaurant.review_count
    );

    if !restaurant.address.is_empty() && !restaurant.city.is_empty() {
        description.push_str(&format!(" · {}, {}", restaurant.address, restaurant.city));
    }

    description
}
