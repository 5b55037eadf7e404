//! Integration tests for `GeminiClient` against a wiremock stand-in for the Gemini API.

use dinner_seeker::normalizer::{fallback_maps_url, NO_SUMMARY_PLACEHOLDER};
use dinner_seeker::{Category, Coordinates, GeminiClient, RecommendationError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";
const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

fn test_client(base_url: &str) -> GeminiClient {
    GeminiClient::with_base_url("test-key", MODEL, base_url)
        .expect("client construction should not fail")
}

fn gemini_body(text: &str, chunks: serde_json::Value) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "groundingMetadata": {"groundingChunks": chunks}
        }]
    })
}

fn steak_house_answer() -> String {
    let records = json!([
        {
            "name": "老王牛排",
            "category": "西式牛排",
            "rating": 4.5,
            "reviewCount": 120,
            "address": "台北市信義區",
            "description": "炭烤牛排",
            "topReview": "好吃",
            "otherReviews": ["讚"],
            "websiteUrl": null,
            "reservationUrl": null
        },
        {
            "name": "一蘭拉麵",
            "category": "日式拉麵店",
            "rating": 4.2
        }
    ]);
    format!("以下是推薦：\n```json\n{}\n```", records)
}

#[tokio::test]
async fn sends_grounded_request_and_normalizes_answer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "tools": [{"googleMaps": {}}],
            "toolConfig": {"retrievalConfig": {"latLng": {"latitude": 25.04, "longitude": 121.55}}},
            "generationConfig": {"temperature": 0.4}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(
            &steak_house_answer(),
            json!([
                {"maps": {"title": "一蘭拉麵 台北本店", "uri": "https://maps.google.com/?cid=99"}}
            ]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let coords = Coordinates::new(25.04, 121.55).unwrap();
    let restaurants = test_client(&server.uri())
        .fetch_recommendations(&coords)
        .await
        .expect("fetch should succeed");

    assert_eq!(restaurants.len(), 2);

    let steak = &restaurants[0];
    assert_eq!(steak.category, Category::Western);
    assert_eq!(steak.google_maps_url, fallback_maps_url("老王牛排"));

    let ramen = &restaurants[1];
    assert_eq!(ramen.category, Category::Japanese);
    assert_eq!(ramen.google_maps_url, "https://maps.google.com/?cid=99");
    assert_eq!(ramen.review_count, 0);
    assert_eq!(ramen.top_review, NO_SUMMARY_PLACEHOLDER);
}

#[tokio::test]
async fn generate_returns_raw_text_and_chunks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(
            "no block here",
            json!([{"web": {"title": "Blog", "uri": "https://blog.example/post"}}]),
        )))
        .mount(&server)
        .await;

    let response = test_client(&server.uri())
        .generate(&Coordinates::default_location())
        .await
        .expect("generate should succeed");

    assert_eq!(response.text, "no block here");
    assert_eq!(response.grounding_chunks.len(), 1);
}

#[tokio::test]
async fn answer_without_block_yields_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(
            "Sorry, I could not find restaurants nearby.",
            json!([]),
        )))
        .mount(&server)
        .await;

    let restaurants = test_client(&server.uri())
        .fetch_recommendations(&Coordinates::default_location())
        .await
        .expect("missing block is not an error");

    assert!(restaurants.is_empty());
}

#[tokio::test]
async fn invalid_json_block_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_body("```json\nnot valid json\n```", json!([]))),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_recommendations(&Coordinates::default_location())
        .await
        .expect_err("invalid JSON must fail the fetch");

    assert!(matches!(err, RecommendationError::Parse(_)), "got {err:?}");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn service_error_status_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_recommendations(&Coordinates::default_location())
        .await
        .expect_err("429 must fail the fetch");

    match err {
        RecommendationError::Api { status, ref body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "quota exhausted");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_service_body_is_an_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .generate(&Coordinates::default_location())
        .await
        .expect_err("HTML body cannot be decoded");

    assert!(matches!(err, RecommendationError::Http(_)), "got {err:?}");
    assert!(!err.to_string().contains("test-key"), "{err}");
}
