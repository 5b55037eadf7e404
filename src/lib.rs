pub mod config;
pub mod error;
pub mod gemini;
pub mod logging;
pub mod normalizer;
pub mod selection;
pub mod server;
pub mod types;
pub mod utils;

pub use error::{ConfigError, RecommendationError};
pub use gemini::GeminiClient;
pub use types::{Category, Coordinates, GroundingChunk, GroundingSource, Restaurant, ViewMode};
