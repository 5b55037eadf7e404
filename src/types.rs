use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::RecommendationError;

/// WGS84 position the recommendations are centred on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, RecommendationError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(RecommendationError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Taipei 101, used when the caller has no location fix.
    pub fn default_location() -> Self {
        Self {
            latitude: 25.033964,
            longitude: 121.564468,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Filter sentinel; never assigned to a restaurant.
    All,
    HotPot,
    Japanese,
    Western,
    Chinese,
    Bbq,
    Other,
}

impl Category {
    pub const ASSIGNABLE: [Category; 6] = [
        Category::HotPot,
        Category::Japanese,
        Category::Western,
        Category::Chinese,
        Category::Bbq,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::All => "全部",
            Category::HotPot => "火鍋",
            Category::Japanese => "日式料理",
            Category::Western => "西式/牛排",
            Category::Chinese => "中式合菜",
            Category::Bbq => "燒肉/烤肉",
            Category::Other => "其他",
        }
    }

    pub fn identifier(self) -> &'static str {
        match self {
            Category::All => "ALL",
            Category::HotPot => "HOT_POT",
            Category::Japanese => "JAPANESE",
            Category::Western => "WESTERN",
            Category::Chinese => "CHINESE",
            Category::Bbq => "BBQ",
            Category::Other => "OTHER",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        std::iter::once(Category::All)
            .chain(Category::ASSIGNABLE)
            .find(|c| c.identifier().eq_ignore_ascii_case(trimmed) || c.label() == trimmed)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Top10,
    All,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top10" => Ok(ViewMode::Top10),
            "all" => Ok(ViewMode::All),
            other => Err(format!("unknown view mode: {}", other)),
        }
    }
}

/// One entry of the model's JSON array, exactly as received. Any field may be
/// missing or carry the wrong type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawModelRecord {
    pub name: Option<Value>,
    pub category: Option<Value>,
    pub rating: Option<Value>,
    pub review_count: Option<Value>,
    pub address: Option<Value>,
    pub description: Option<Value>,
    pub top_review: Option<Value>,
    pub other_reviews: Option<Value>,
    pub website_url: Option<Value>,
    pub reservation_url: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub rating: f64,
    pub review_count: u64,
    pub address: String,
    pub description: String,
    pub top_review: String,
    pub other_reviews: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_url: Option<String>,
    pub google_maps_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: Option<String>,
    pub uri: Option<String>,
}

/// Citation attached by the maps-grounding tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<GroundingSource>,
    pub maps: Option<GroundingSource>,
}

/// Raw output of one generation call, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub text: String,
    pub grounding_chunks: Vec<GroundingChunk>,
}
