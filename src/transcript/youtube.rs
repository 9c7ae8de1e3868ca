use async_trait::async_trait;
use yt_transcript_rs::api::YouTubeTranscriptApi;

use super::TranscriptSource;
use crate::Result;

/// Caption transcripts fetched directly from YouTube.
pub struct YoutubeCaptions {
    api: YouTubeTranscriptApi,
}

impl YoutubeCaptions {
    pub fn new() -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| anyhow::anyhow!("Failed to initialize the caption client: {e}"))?;

        Ok(Self { api })
    }
}

#[async_trait]
impl TranscriptSource for YoutubeCaptions {
    async fn fetch_segments(&self, video_id: &str, languages: &[String]) -> Result<Vec<String>> {
        let languages: Vec<&str> = languages.iter().map(String::as_str).collect();

        let transcript = self
            .api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(|e| anyhow::anyhow!("Caption fetch failed for {video_id}: {e}"))?;

        tracing::debug!(
            "Fetched {} caption snippets ({})",
            transcript.snippets.len(),
            transcript.language_code,
        );

        Ok(transcript
            .snippets
            .into_iter()
            .map(|snippet| snippet.text)
            .collect())
    }
}
