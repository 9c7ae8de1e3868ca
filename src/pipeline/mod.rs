use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::enrich::{Place, PlaceEnricher};
use crate::extract::PlaceExtractor;
use crate::transcript::TranscriptProvider;
use crate::{utils, video, Result, ScoutError};

/// The outcome of one full video analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Places mentioned in the video, in extraction order
    pub places: Vec<Place>,

    /// One-line summary of the run
    pub summary: String,
}

/// Main analysis pipeline: URL to video id, transcript, extracted
/// candidates, enriched places.
pub struct AnalysisPipeline {
    transcripts: TranscriptProvider,
    extractor: PlaceExtractor,
    enricher: PlaceEnricher,
}

impl AnalysisPipeline {
    /// Create a new analysis pipeline
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            transcripts: TranscriptProvider::new(config)?,
            extractor: PlaceExtractor::new(config),
            enricher: PlaceEnricher::new(config),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        transcripts: TranscriptProvider,
        extractor: PlaceExtractor,
        enricher: PlaceEnricher,
    ) -> Self {
        Self {
            transcripts,
            extractor,
            enricher,
        }
    }

    /// Analyze a video URL and return the places its narration mentions.
    pub async fn analyze(&self, url: &str) -> Result<AnalysisResult> {
        let Some(video_id) = video::resolve_video_id(url) else {
            tracing::warn!("No video id found in URL: {}", url);
            return Err(ScoutError::InvalidUrl(url.to_string()).into());
        };

        match utils::extract_domain(url) {
            Some(domain) => tracing::info!("Analyzing video {} from {}", video_id, domain),
            None => tracing::info!("Analyzing video {}", video_id),
        }

        let spinner = stage_spinner("Fetching transcript...");
        let transcript = self.transcripts.transcript(&video_id).await;
        spinner.finish_and_clear();
        let transcript = transcript?;

        let spinner = stage_spinner("Extracting places with AI...");
        let candidates = self.extractor.extract_places(&transcript).await;
        spinner.finish_and_clear();
        let candidates = candidates?;

        let places = self.enricher.enrich(&candidates).await;

        let summary = format!(
            "Extracted {} tourist places from video {}",
            places.len(),
            video_id
        );
        tracing::info!("{}", summary);

        Ok(AnalysisResult { places, summary })
    }

    /// Fetch the transcript for a video URL without analyzing it.
    pub async fn transcript(&self, url: &str) -> Result<String> {
        let video_id = video::resolve_video_id(url)
            .ok_or_else(|| ScoutError::InvalidUrl(url.to_string()))?;

        self.transcripts.transcript(&video_id).await
    }
}

fn stage_spinner(message: &'static str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::enrich::{GeocodedLocation, MapsProvider, PlaceEnricher};
    use crate::extract::{MockChatModel, PlaceExtractor, PlaceType};
    use crate::transcript::{TranscriptProvider, TranscriptSource};

    struct StubCaptions(Vec<String>);

    #[async_trait]
    impl TranscriptSource for StubCaptions {
        async fn fetch_segments(
            &self,
            _video_id: &str,
            _languages: &[String],
        ) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    struct WarsawMaps;

    #[async_trait]
    impl MapsProvider for WarsawMaps {
        async fn geocode(&self, _address: &str) -> Result<GeocodedLocation> {
            Ok(GeocodedLocation {
                lat: 52.2297,
                lng: 21.0122,
                place_id: Some("ChIJwarsaw".to_string()),
                formatted_address: Some("Warsaw, Poland".to_string()),
            })
        }

        async fn photo_urls(&self, _query: &str) -> Result<Vec<String>> {
            Ok(vec!["https://photos.test/warsaw".to_string()])
        }
    }

    fn captions_for(text: &str) -> TranscriptProvider {
        let segments = text.split(' ').map(str::to_string).collect();
        TranscriptProvider::with_sources(
            vec!["en".to_string(), "pl".to_string()],
            Box::new(StubCaptions(segments)),
            None,
        )
    }

    #[tokio::test]
    async fn analyzes_a_video_end_to_end() {
        let mut chat = MockChatModel::new();
        chat.expect_complete()
            .withf(|_, user| user.contains("Warsaw is beautiful"))
            .returning(|_, _| {
                Ok(Some(
                    r#"{"places": [{"name": "Warsaw", "description": "The capital of Poland", "type": "city"}]}"#
                        .to_string(),
                ))
            });

        let pipeline = AnalysisPipeline::from_parts(
            captions_for("Warsaw is beautiful"),
            PlaceExtractor::with_chat(Box::new(chat)),
            PlaceEnricher::with_provider(Box::new(WarsawMaps)),
        );

        let result = pipeline.analyze("https://youtu.be/abc123").await.unwrap();

        assert_eq!(result.places.len(), 1);
        let place = &result.places[0];
        assert_eq!(place.id, "ChIJwarsaw");
        assert_eq!(place.name, "Warsaw");
        assert_eq!(place.kind, PlaceType::City);
        assert!((place.coordinates.lat - 52.2297).abs() < 1e-9);
        assert!((place.coordinates.lng - 21.0122).abs() < 1e-9);
        assert_eq!(place.address.as_deref(), Some("Warsaw, Poland"));
        assert_eq!(place.photo_url.as_deref(), Some("https://photos.test/warsaw"));
        assert_eq!(result.summary, "Extracted 1 tourist places from video abc123");
    }

    #[tokio::test]
    async fn rejects_urls_without_a_video_id() {
        let chat = MockChatModel::new();
        let pipeline = AnalysisPipeline::from_parts(
            captions_for("irrelevant"),
            PlaceExtractor::with_chat(Box::new(chat)),
            PlaceEnricher::without_provider(),
        );

        let err = pipeline
            .analyze("https://example.com/watch?v=abc")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ScoutError>(),
            Some(ScoutError::InvalidUrl(url)) if url == "https://example.com/watch?v=abc"
        ));
    }

    #[tokio::test]
    async fn transcript_command_skips_extraction() {
        // No expectations on the chat mock: analysis stages must not run.
        let chat = MockChatModel::new();
        let pipeline = AnalysisPipeline::from_parts(
            captions_for("Warsaw is beautiful"),
            PlaceExtractor::with_chat(Box::new(chat)),
            PlaceEnricher::without_provider(),
        );

        let transcript = pipeline
            .transcript("https://www.youtube.com/watch?v=abc123")
            .await
            .unwrap();

        assert_eq!(transcript, "Warsaw is beautiful");
    }

    #[tokio::test]
    async fn extraction_errors_stop_the_run() {
        let mut chat = MockChatModel::new();
        chat.expect_complete().returning(|_, _| Ok(Some("not json".to_string())));

        let pipeline = AnalysisPipeline::from_parts(
            captions_for("some narration"),
            PlaceExtractor::with_chat(Box::new(chat)),
            PlaceEnricher::without_provider(),
        );

        let err = pipeline.analyze("https://youtu.be/abc123").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ScoutError>(),
            Some(ScoutError::AiResponseInvalid(_))
        ));
    }

    #[tokio::test]
    async fn no_places_is_a_valid_outcome() {
        let mut chat = MockChatModel::new();
        chat.expect_complete()
            .returning(|_, _| Ok(Some(r#"{"places": []}"#.to_string())));

        let pipeline = AnalysisPipeline::from_parts(
            captions_for("nothing notable here"),
            PlaceExtractor::with_chat(Box::new(chat)),
            PlaceEnricher::without_provider(),
        );

        let result = pipeline.analyze("https://youtu.be/abc123").await.unwrap();
        assert!(result.places.is_empty());
        assert_eq!(result.summary, "Extracted 0 tourist places from video abc123");
    }
}
