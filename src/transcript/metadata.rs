use async_trait::async_trait;
use serde::Deserialize;

use super::VideoMetadataSource;
use crate::Result;

const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Video description lookup through the YouTube Data API v3.
pub struct YoutubeDataApi {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    #[serde(default)]
    description: String,
}

impl YoutubeDataApi {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl VideoMetadataSource for YoutubeDataApi {
    async fn description(&self, video_id: &str) -> Result<String> {
        tracing::debug!("Fetching video metadata for: {}", video_id);

        let response = self
            .client
            .get(VIDEOS_URL)
            .query(&[
                ("part", "snippet"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("YouTube Data API returned HTTP {status}");
        }

        let parsed: VideoListResponse = response.json().await?;

        let item = parsed
            .items
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("YouTube Data API has no entry for video {video_id}"))?;

        Ok(item.snippet.description)
    }
}
