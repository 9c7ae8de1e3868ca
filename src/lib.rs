//! Trip Scout - A Rust CLI tool that turns YouTube travel videos into map-ready place lists
//!
//! This library provides functionality to fetch a video transcript, extract the tourist
//! places its narration mentions using an OpenAI model, and enrich each place with
//! coordinates and photos from the Google Maps APIs.

pub mod cli;
pub mod config;
pub mod enrich;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod transcript;
pub mod utils;
pub mod video;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use enrich::{Coordinates, Place, PlaceEnricher};
pub use extract::{PlaceCandidate, PlaceExtractor, PlaceType};
pub use pipeline::{AnalysisPipeline, AnalysisResult};
pub use transcript::TranscriptProvider;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the analyzer
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("OpenAI API key is not configured")]
    AiServiceUnavailable,

    #[error("AI service returned an empty response")]
    AiResponseEmpty,

    #[error("AI response is not valid JSON: {0}")]
    AiResponseInvalid(#[source] serde_json::Error),
}
