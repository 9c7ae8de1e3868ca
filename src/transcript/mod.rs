pub mod metadata;
pub mod youtube;

use async_trait::async_trait;

use crate::config::Config;
use crate::{Result, ScoutError};

/// Source of caption transcripts for a video id.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch transcript segments in playback order.
    async fn fetch_segments(&self, video_id: &str, languages: &[String]) -> Result<Vec<String>>;
}

/// Source of video metadata, used when no captions are available.
#[async_trait]
pub trait VideoMetadataSource: Send + Sync {
    /// Fetch the video description.
    async fn description(&self, video_id: &str) -> Result<String>;
}

/// Fetches the text to analyze for a video: captions first, with the video
/// description as a fallback when a Data API key is configured.
pub struct TranscriptProvider {
    languages: Vec<String>,
    captions: Box<dyn TranscriptSource>,
    metadata: Option<Box<dyn VideoMetadataSource>>,
}

impl TranscriptProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let captions = Box::new(youtube::YoutubeCaptions::new()?);

        let metadata = config.youtube.api_key.clone().map(|key| {
            Box::new(metadata::YoutubeDataApi::new(key)) as Box<dyn VideoMetadataSource>
        });

        Ok(Self {
            languages: config.app.transcript_languages.clone(),
            captions,
            metadata,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_sources(
        languages: Vec<String>,
        captions: Box<dyn TranscriptSource>,
        metadata: Option<Box<dyn VideoMetadataSource>>,
    ) -> Self {
        Self {
            languages,
            captions,
            metadata,
        }
    }

    /// Obtain the transcript text for a video.
    ///
    /// Caption segments are joined with single spaces. When the caption fetch
    /// fails and a YouTube Data API key is available, the video description
    /// stands in for the transcript.
    pub async fn transcript(&self, video_id: &str) -> Result<String> {
        tracing::info!("Getting transcript for video: {}", video_id);

        let caption_error = match self.captions.fetch_segments(video_id, &self.languages).await {
            Ok(segments) => {
                let transcript = segments.join(" ");
                if transcript.trim().is_empty() {
                    return Err(ScoutError::TranscriptUnavailable(format!(
                        "video {video_id} has an empty transcript"
                    ))
                    .into());
                }

                tracing::info!("Transcript received: {} characters", transcript.len());
                return Ok(transcript);
            }
            Err(e) => e,
        };

        tracing::warn!("Could not fetch captions: {}", caption_error);

        let Some(metadata) = &self.metadata else {
            return Err(ScoutError::TranscriptUnavailable(format!(
                "no captions ({caption_error}) and no YouTube API key for the description fallback"
            ))
            .into());
        };

        tracing::info!("Trying video description as a fallback");

        match metadata.description(video_id).await {
            Ok(description) if !description.trim().is_empty() => {
                tracing::info!(
                    "Using video description as transcript: {} characters",
                    description.len()
                );
                Ok(description)
            }
            Ok(_) => Err(ScoutError::TranscriptUnavailable(format!(
                "no captions ({caption_error}) and the video has no description"
            ))
            .into()),
            Err(fallback_error) => Err(ScoutError::TranscriptUnavailable(format!(
                "no captions ({caption_error}); description fallback failed: {fallback_error}"
            ))
            .into()),
        }
    }
}
