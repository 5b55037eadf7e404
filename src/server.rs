use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::gemini::GeminiClient;
use crate::selection;
use crate::types::{Category, Coordinates, Restaurant, ViewMode};

pub const FETCH_FAILED_MESSAGE: &str =
    "Failed to fetch restaurant recommendations, please try again later";

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    latitude: Option<f64>,
    longitude: Option<f64>,
    category: Option<String>,
    view: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    expected_format: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub location: Coordinates,
    pub used_default_location: bool,
    pub category: Category,
    pub view: ViewMode,
    pub total: usize,
    pub restaurants: Vec<Restaurant>,
}

fn expected_format() -> serde_json::Value {
    serde_json::json!({
        "latitude": 25.033964,
        "longitude": 121.564468,
        "category": "HOT_POT",
        "view": "top10"
    })
}

fn bad_request(request_id: &str, message: String) -> HttpResponse {
    warn!("Request {}: {}", request_id, message);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: message,
        expected_format: expected_format(),
    })
}

/// Resolves the request location, falling back to the default when none was sent.
fn resolve_location(query: &RecommendationQuery) -> Result<(Coordinates, bool), String> {
    match (query.latitude, query.longitude) {
        (Some(latitude), Some(longitude)) => Coordinates::new(latitude, longitude)
            .map(|coords| (coords, false))
            .map_err(|e| e.to_string()),
        (None, None) => Ok((Coordinates::default_location(), true)),
        _ => Err("latitude and longitude must be provided together".to_string()),
    }
}

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "message": "Server is running"
    }))
}

pub async fn recommendations(
    query: web::Query<RecommendationQuery>,
    client: web::Data<GeminiClient>,
) -> impl Responder {
    let request_id = chrono::Utc::now().format("%Y%m%d%H%M%S%f").to_string();
    info!("Request {}: Recommendations requested", request_id);
    debug!("Request {}: Query: {:?}", request_id, query);

    let (location, used_default_location) = match resolve_location(&query) {
        Ok(resolved) => resolved,
        Err(message) => return bad_request(&request_id, message),
    };
    if used_default_location {
        info!("Request {}: No location supplied, using default", request_id);
    }

    let category = match query.category.as_deref().map(str::parse::<Category>) {
        None => Category::All,
        Some(Ok(category)) => category,
        Some(Err(message)) => return bad_request(&request_id, message),
    };
    let view = match query.view.as_deref().map(str::parse::<ViewMode>) {
        None => ViewMode::default(),
        Some(Ok(view)) => view,
        Some(Err(message)) => return bad_request(&request_id, message),
    };

    let restaurants = match client.fetch_recommendations(&location).await {
        Ok(restaurants) => restaurants,
        Err(e) => {
            error!("Request {}: Error fetching recommendations: {}", request_id, e);
            return HttpResponse::BadGateway().json(ErrorResponse {
                error: FETCH_FAILED_MESSAGE.to_string(),
                expected_format: expected_format(),
            });
        }
    };

    let selected = selection::select(&restaurants, category, view);
    info!(
        "Request {}: Returning {} of {} restaurants ({} fetched)",
        request_id,
        selected.restaurants.len(),
        selected.total,
        restaurants.len()
    );

    HttpResponse::Ok().json(RecommendationsResponse {
        location,
        used_default_location,
        category,
        view,
        total: selected.total,
        restaurants: selected.restaurants,
    })
}

/// Registers the service routes. Middleware is left to the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/recommendations", web::get().to(recommendations));
}
