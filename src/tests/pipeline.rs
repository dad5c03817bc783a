//! End-to-end tests of the search pipeline: normalize -> embed ->
//! retrieve -> filter -> truncate.

use super::{default_fixture, restaurant, stub_service};
use crate::restaurants::SearchFilters;

#[test]
fn test_korean_query_recommends_pizza() {
    let service = default_fixture();

    // Normalization expands the Korean query with English keywords, the
    // stub embedder maps "pizza" onto its axis, and the detected category
    // preference filters out the orthogonal hits
    let results = service.recommend("피자 추천해줘", 3);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].restaurant.name, "Mario's");
    assert!(results[0].score > 0.9);
}

#[test]
fn test_english_query_ranks_by_similarity() {
    let service = default_fixture();

    let results = service.search("sushi dinner tonight", None, 3);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].restaurant.name, "Sakura");
    assert!(results[0].score > results[1].score);
}

#[test]
fn test_explicit_min_stars_filter() {
    let service = stub_service(vec![
        restaurant("Cheap Slice", &["Pizza"], 3.0, "cheap slice pizza"),
        restaurant("Fancy Pie", &["Pizza"], 4.5, "fancy pie pizza"),
    ]);

    let filters = SearchFilters {
        min_stars: Some(4.0),
        ..Default::default()
    };
    let results = service.search("pizza", Some(&filters), 3);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].restaurant.name, "Fancy Pie");
}

#[test]
fn test_overfetch_leaves_headroom_for_filters() {
    // Both restaurants sit on the pizza axis; the better-scored one fails
    // the filter. With limit 1 the pipeline still finds the passing one
    // because it retrieves a 2x candidate pool.
    let service = stub_service(vec![
        restaurant("Low Star Pizza", &["Pizza"], 2.5, "low star pizza"),
        restaurant(
            "High Star Cafe",
            &["Pizza", "Coffee & Tea"],
            5.0,
            "high star pizza coffee",
        ),
    ]);

    let filters = SearchFilters {
        min_stars: Some(4.0),
        ..Default::default()
    };
    let results = service.search("pizza", Some(&filters), 1);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].restaurant.name, "High Star Cafe");
}

#[test]
fn test_limit_truncates_after_filtering() {
    let service = stub_service(vec![
        restaurant("A", &["Pizza"], 4.0, "a pizza"),
        restaurant("B", &["Pizza"], 4.0, "b pizza"),
        restaurant("C", &["Pizza"], 4.0, "c pizza"),
    ]);

    let results = service.search("pizza", None, 2);
    assert_eq!(results.len(), 2);
}

#[test]
fn test_empty_query_degrades_to_empty_results() {
    let service = default_fixture();

    // The embedder rejects the empty input; the pipeline swallows the
    // error and returns nothing
    assert!(service.recommend("", 3).is_empty());
    assert!(service.search("", None, 3).is_empty());
}

#[test]
fn test_zero_limit_returns_nothing() {
    let service = default_fixture();
    assert!(service.search("pizza", None, 0).is_empty());
}

#[test]
fn test_location_filter_excludes_other_cities() {
    let mut away = restaurant("Far Pizza", &["Pizza"], 4.5, "far pizza");
    away.city = "Goleta".to_string();

    let service = stub_service(vec![
        restaurant("Near Pizza", &["Pizza"], 4.5, "near pizza"),
        away,
    ]);

    let filters = SearchFilters {
        location: Some("santa barbara".to_string()),
        ..Default::default()
    };
    let results = service.search("pizza", Some(&filters), 3);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].restaurant.name, "Near Pizza");
}

#[test]
fn test_korean_preferences_drive_boolean_filters() {
    let mut kids = restaurant("Family Pizza", &["Pizza", "Italian"], 4.0, "family pizza");
    kids.good_for_kids = true;

    let service = stub_service(vec![
        restaurant("Bar Pizza", &["Pizza", "Italian"], 4.0, "bar pizza"),
        kids,
    ]);

    // "가족과 함께" expands to family-related keywords, which sets the
    // good_for_kids preference
    let results = service.recommend("가족과 함께 피자 먹고 싶어", 3);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].restaurant.name, "Family Pizza");
}
