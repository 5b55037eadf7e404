use thiserror::Error;

/// Errors surfaced by a recommendation fetch.
///
/// "No structured payload in the model output" is not an error: it yields an empty
/// result set instead.
#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("coordinates must be finite numbers (latitude: {latitude}, longitude: {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Gemini API key is missing")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model output contained invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model output JSON is not an array of restaurants")]
    NotAnArray,
}

impl RecommendationError {
    /// Transport and service failures may succeed on a later attempt; bad input and
    /// malformed model output will not change by asking again with the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Api { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_failures_are_retryable() {
        let err = RecommendationError::Api {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Gemini API returned 503: overloaded");
    }

    #[test]
    fn parse_failures_are_not_retryable() {
        let err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
        assert!(!RecommendationError::from(err).is_retryable());
        assert!(!RecommendationError::NotAnArray.is_retryable());
        assert!(!RecommendationError::MissingApiKey.is_retryable());
    }
}
