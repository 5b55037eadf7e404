use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::RecommendationError;
use crate::normalizer;
use crate::types::{Coordinates, GroundingChunk, ModelResponse, Restaurant};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const TEMPERATURE: f64 = 0.4;

// Sent as a header so the key never appears in request URLs (and so in reqwest errors).
const API_KEY_HEADER: &str = "x-goog-api-key";

// --- Gemini wire format ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
    tool_config: ToolConfig,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_maps: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolConfig {
    retrieval_config: RetrievalConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfig {
    lat_lng: Coordinates,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GroundingMetadata {
    grounding_chunks: Vec<GroundingChunk>,
}

impl GenerateContentResponse {
    fn into_model_response(self) -> ModelResponse {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return ModelResponse::default();
        };

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        let grounding_chunks = candidate
            .grounding_metadata
            .map(|metadata| metadata.grounding_chunks)
            .unwrap_or_default();

        ModelResponse {
            text,
            grounding_chunks,
        }
    }
}

pub fn build_prompt(coords: &Coordinates) -> String {
    format!(
        r#"I am at latitude: {latitude}, longitude: {longitude}.
Please act as a local dining expert. I need a list of at least 15-20 excellent dinner restaurants within a 2km radius.

Please include a diverse mix of these categories:
- Hot Pot (火鍋)
- Japanese (日式料理)
- Western/Steak (西式/牛排)
- Chinese (中式合菜)
- BBQ (燒肉/烤肉)

For each restaurant, please provide the following details in a STRICT JSON format inside a code block:
- name: Restaurant name.
- category: One of the categories listed above.
- rating: Google rating (number, e.g., 4.5).
- reviewCount: Approximate number of reviews.
- address: Address string.
- description: Short appetizing description (1 sentence).
- topReview: A summary or text of the most helpful/liked positive review.
- otherReviews: An array of strings containing 2 other summary points from reviews.
- websiteUrl: Official website URL (if available, otherwise null).
- reservationUrl: Online booking URL (e.g., inline apps, opentable, or local equivalents, otherwise null).

CRITICAL: You MUST use the Google Maps tool to verify the existence, rating, and location of these places.
Output the JSON array inside a markdown code block labeled 'json'."#,
        latitude = coords.latitude,
        longitude = coords.longitude,
    )
}

/// Client for the Gemini `generateContent` endpoint with maps grounding enabled.
///
/// Construct once and share; cloning is cheap.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Result<Self, RecommendationError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: &str,
        model: &str,
        base_url: &str,
    ) -> Result<Self, RecommendationError> {
        if api_key.trim().is_empty() {
            return Err(RecommendationError::MissingApiKey);
        }
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Sends one grounded generation request and returns the raw answer text with
    /// its citations. No retries.
    pub async fn generate(&self, coords: &Coordinates) -> Result<ModelResponse, RecommendationError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart {
                    text: build_prompt(coords),
                }],
            }],
            tools: vec![Tool {
                google_maps: serde_json::Map::new(),
            }],
            tool_config: ToolConfig {
                retrieval_config: RetrievalConfig { lat_lng: *coords },
            },
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        info!(
            "Requesting recommendations from {} near {}, {}",
            self.model, coords.latitude, coords.longitude
        );

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Gemini API error {}: {}", status, body);
            return Err(RecommendationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let model_response = parsed.into_model_response();
        debug!(
            "Gemini returned {} characters and {} grounding chunks",
            model_response.text.len(),
            model_response.grounding_chunks.len()
        );
        Ok(model_response)
    }

    pub async fn fetch_recommendations(
        &self,
        coords: &Coordinates,
    ) -> Result<Vec<Restaurant>, RecommendationError> {
        let response = self.generate(coords).await?;
        let restaurants = normalizer::normalize(&response.text, &response.grounding_chunks)?;
        info!("Normalized {} restaurants", restaurants.len());
        Ok(restaurants)
    }
}
