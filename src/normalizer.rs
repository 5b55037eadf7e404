//! Turns the model's free-form answer into typed [`Restaurant`] records.
//!
//! The pipeline runs in stages: locate the fenced JSON block, parse it into loosely
//! typed records, then normalize each record (defaults, category, map link).

use chrono::Utc;
use log::{debug, warn};
use regex::Regex;
use serde_json::Value;

use crate::error::RecommendationError;
use crate::types::{Category, GroundingChunk, GroundingSource, RawModelRecord, Restaurant};
use crate::utils;

pub const NO_SUMMARY_PLACEHOLDER: &str = "暫無評論摘要";
pub const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

lazy_static::lazy_static! {
    static ref LABELED_JSON_BLOCK: Regex =
        Regex::new(r"(?si)```json[ \t]*\r?\n(.*?)\r?\n[ \t]*```").expect("valid regex");
    static ref UNLABELED_BLOCK: Regex =
        Regex::new(r"(?s)```[ \t]*\r?\n(.*?)\r?\n[ \t]*```").expect("valid regex");
}

/// Keyword rules in precedence order; the first rule with a matching keyword wins.
pub const CATEGORY_RULES: &[(&[&str], Category)] = &[
    (&["火鍋"], Category::HotPot),
    (&["日式", "壽司", "拉麵"], Category::Japanese),
    (&["西式", "牛排", "義大利"], Category::Western),
    (&["中式", "台菜", "合菜"], Category::Chinese),
    (&["燒肉", "烤肉"], Category::Bbq),
];

/// Finds the payload of a ```` ```json ```` block, or of the first unlabeled fenced
/// block when no labeled one exists.
pub fn locate_json_block(text: &str) -> Option<&str> {
    LABELED_JSON_BLOCK
        .captures(text)
        .or_else(|| UNLABELED_BLOCK.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn parse_records(block: &str) -> Result<Vec<Value>, RecommendationError> {
    match serde_json::from_str::<Value>(block)? {
        Value::Array(items) => Ok(items),
        other => {
            warn!("Expected a JSON array from the model, got: {}", other);
            Err(RecommendationError::NotAnArray)
        }
    }
}

pub fn classify_category(raw: &str) -> Category {
    CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| raw.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}

pub fn fallback_maps_url(name: &str) -> String {
    format!("{}{}", MAPS_SEARCH_URL, utils::encode_uri_component(name))
}

/// Best-effort link lookup: the first citation whose web or maps title contains the
/// restaurant name, preferring its maps URI. Falls back to a search URL.
pub fn resolve_maps_url(name: &str, chunks: &[GroundingChunk]) -> String {
    let title_matches = |source: &Option<GroundingSource>| {
        source
            .as_ref()
            .and_then(|s| s.title.as_deref())
            .map_or(false, |title| title.contains(name))
    };
    let uri_of = |source: &Option<GroundingSource>| {
        source
            .as_ref()
            .and_then(|s| s.uri.as_deref())
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .map(String::from)
    };

    let matched = chunks
        .iter()
        .find(|chunk| title_matches(&chunk.web) || title_matches(&chunk.maps));

    match matched.and_then(|chunk| uri_of(&chunk.maps).or_else(|| uri_of(&chunk.web))) {
        Some(uri) => uri,
        None => {
            debug!("No grounding link for {}, using search fallback", name);
            fallback_maps_url(name)
        }
    }
}

fn text_field(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(value: &Option<Value>) -> Option<f64> {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn link_field(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => utils::sanitize_link(s),
        _ => None,
    }
}

fn review_list(value: &Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Builds a [`Restaurant`] from one raw record. Returns `None` when the record has no
/// usable name.
pub fn normalize_record(
    index: usize,
    fetched_at: i64,
    raw: &RawModelRecord,
    chunks: &[GroundingChunk],
) -> Option<Restaurant> {
    let name = text_field(&raw.name).filter(|n| !n.is_empty())?;
    let category = text_field(&raw.category)
        .map(|c| classify_category(&c))
        .unwrap_or(Category::Other);
    let review_count = number_field(&raw.review_count)
        .map(|n| n.round().max(0.0) as u64)
        .unwrap_or(0);
    let top_review = text_field(&raw.top_review)
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| NO_SUMMARY_PLACEHOLDER.to_string());
    let google_maps_url = resolve_maps_url(&name, chunks);

    Some(Restaurant {
        id: format!("rest-{}-{}", index, fetched_at),
        category,
        rating: number_field(&raw.rating).unwrap_or(0.0),
        review_count,
        address: text_field(&raw.address).unwrap_or_default(),
        description: text_field(&raw.description).unwrap_or_default(),
        top_review,
        other_reviews: review_list(&raw.other_reviews),
        website_url: link_field(&raw.website_url),
        reservation_url: link_field(&raw.reservation_url),
        google_maps_url,
        name,
    })
}

const PREVIEW_CHARS: usize = 200;

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Runs the whole pipeline over a model answer.
///
/// A missing payload yields an empty list; a payload that is present but not a JSON
/// array is an error.
pub fn normalize(
    text: &str,
    chunks: &[GroundingChunk],
) -> Result<Vec<Restaurant>, RecommendationError> {
    let Some(block) = locate_json_block(text) else {
        warn!(
            "No JSON block found in model response ({} bytes): {}",
            text.len(),
            preview(text)
        );
        debug!("Full model response: {}", text);
        return Ok(Vec::new());
    };

    let items = parse_records(block)?;
    let fetched_at = Utc::now().timestamp_millis();
    debug!("Model returned {} raw records", items.len());

    let restaurants: Vec<Restaurant> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if !item.is_object() {
                warn!("Skipping record {}: not an object", index);
                return None;
            }
            let raw = match serde_json::from_value::<RawModelRecord>(item) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Skipping record {}: {}", index, e);
                    return None;
                }
            };
            let restaurant = normalize_record(index, fetched_at, &raw, chunks);
            if restaurant.is_none() {
                warn!("Skipping record {}: missing name", index);
            }
            restaurant
        })
        .collect();

    Ok(restaurants)
}
