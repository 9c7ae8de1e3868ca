pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::{utils, Result, ScoutError};

/// Categories a place can be mapped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceType {
    Park,
    Mountains,
    Sea,
    City,
    Lake,
    Monument,
    Other,
}

impl PlaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Park => "park",
            Self::Mountains => "mountains",
            Self::Sea => "sea",
            Self::City => "city",
            Self::Lake => "lake",
            Self::Monument => "monument",
            Self::Other => "other",
        }
    }

    /// Parse a raw type label; anything unrecognized collapses to `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "park" => Self::Park,
            "mountains" => Self::Mountains,
            "sea" => Self::Sea,
            "city" => Self::City,
            "lake" => Self::Lake,
            "monument" => Self::Monument,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for PlaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A place mentioned in the transcript, as named by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceCandidate {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type", default)]
    pub kind: String,
}

/// The JSON envelope the model is asked to produce.
#[derive(Debug, Deserialize)]
struct ExtractionPlan {
    #[serde(default)]
    places: Vec<PlaceCandidate>,
}

/// Chat completion backend used for place extraction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one system + user exchange and return the assistant content,
    /// or `None` when the service produced no content at all.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<Option<String>>;
}

const SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts tourist places from video \
                             transcripts. Always respond with valid JSON.";

const RESPONSE_EXAMPLE: &str = r#"{
  "places": [
    {
      "name": "place name",
      "description": "a few sentences about what makes this place worth visiting",
      "type": "one of: park, mountains, sea, city, lake, monument, other"
    }
  ]
}"#;

/// Asks an OpenAI model which tourist places a transcript mentions.
pub struct PlaceExtractor {
    chat: Option<Box<dyn ChatModel>>,
}

impl PlaceExtractor {
    pub fn new(config: &Config) -> Self {
        let chat = config.openai.api_key.clone().map(|key| {
            Box::new(openai::OpenAiChat::new(
                key,
                config.openai.model.clone(),
                config.openai.base_url.clone(),
            )) as Box<dyn ChatModel>
        });

        Self { chat }
    }

    #[cfg(test)]
    pub(crate) fn with_chat(chat: Box<dyn ChatModel>) -> Self {
        Self { chat: Some(chat) }
    }

    /// Extract place candidates from a transcript.
    ///
    /// Candidate order follows the model response, and every candidate comes
    /// back with a valid type label.
    pub async fn extract_places(&self, transcript: &str) -> Result<Vec<PlaceCandidate>> {
        let Some(chat) = &self.chat else {
            return Err(ScoutError::AiServiceUnavailable.into());
        };

        tracing::info!(
            "Analyzing transcript with AI: {} characters",
            transcript.len()
        );

        let user_prompt = build_user_prompt(transcript);
        let content = chat
            .complete(SYSTEM_PROMPT, &user_prompt)
            .await?
            .filter(|content| !content.trim().is_empty())
            .ok_or(ScoutError::AiResponseEmpty)?;

        tracing::debug!("Model content: {}", utils::preview(&content, 400));

        let candidates = parse_candidates(&content)?;
        tracing::info!("AI analysis completed: {} places found", candidates.len());

        Ok(candidates)
    }
}

fn build_user_prompt(transcript: &str) -> String {
    format!(
        "Your task is to extract tourist places mentioned in a video transcript. \
         Return output in JSON format:\n{RESPONSE_EXAMPLE}\n\n\
         Extract tourist places from this video transcript: {transcript}"
    )
}

/// Strip a Markdown code fence from model output.
///
/// Models wrap JSON in ```json fences often enough that this runs on every
/// response; content without fences passes through untouched.
fn strip_code_fences(content: &str) -> &str {
    let mut text = content.trim();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest.trim();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim();
    }

    text
}

fn parse_candidates(content: &str) -> Result<Vec<PlaceCandidate>> {
    let body = strip_code_fences(content);

    let plan: ExtractionPlan = serde_json::from_str(body).map_err(|e| {
        tracing::debug!("Unparseable model content: {}", body);
        ScoutError::AiResponseInvalid(e)
    })?;

    let mut candidates = plan.places;
    for candidate in &mut candidates {
        let kind = PlaceType::from_label(&candidate.kind);
        if kind == PlaceType::Other && candidate.kind != "other" {
            tracing::debug!(
                "Rewriting unknown place type '{}' for '{}'",
                candidate.kind,
                candidate.name
            );
        }
        candidate.kind = kind.as_str().to_string();
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extraction_requires_an_api_key() {
        let extractor = PlaceExtractor::new(&Config::default());
        let err = extractor.extract_places("a transcript").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ScoutError>(),
            Some(ScoutError::AiServiceUnavailable)
        ));
    }

    #[tokio::test]
    async fn parses_places_from_the_model_response() {
        let mut chat = MockChatModel::new();
        chat.expect_complete()
            .withf(|system, user| {
                system.contains("valid JSON") && user.contains("Warsaw has a lovely old town")
            })
            .returning(|_, _| {
                Ok(Some(
                    r#"{"places": [{"name": "Warsaw", "description": "The capital", "type": "city"}]}"#
                        .to_string(),
                ))
            });

        let extractor = PlaceExtractor::with_chat(Box::new(chat));
        let candidates = extractor
            .extract_places("Warsaw has a lovely old town")
            .await
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Warsaw");
        assert_eq!(candidates[0].description, "The capital");
        assert_eq!(candidates[0].kind, "city");
    }

    #[tokio::test]
    async fn fenced_responses_are_parsed() {
        let mut chat = MockChatModel::new();
        chat.expect_complete().returning(|_, _| {
            Ok(Some(
                "```json\n{\"places\": [{\"name\": \"Morskie Oko\", \"description\": \"\", \"type\": \"lake\"}]}\n```"
                    .to_string(),
            ))
        });

        let extractor = PlaceExtractor::with_chat(Box::new(chat));
        let candidates = extractor.extract_places("transcript").await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, "lake");
    }

    #[tokio::test]
    async fn missing_content_is_an_empty_response() {
        let mut chat = MockChatModel::new();
        chat.expect_complete().returning(|_, _| Ok(None));

        let extractor = PlaceExtractor::with_chat(Box::new(chat));
        let err = extractor.extract_places("transcript").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ScoutError>(),
            Some(ScoutError::AiResponseEmpty)
        ));
    }

    #[tokio::test]
    async fn whitespace_content_is_an_empty_response() {
        let mut chat = MockChatModel::new();
        chat.expect_complete()
            .returning(|_, _| Ok(Some("   \n".to_string())));

        let extractor = PlaceExtractor::with_chat(Box::new(chat));
        let err = extractor.extract_places("transcript").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ScoutError>(),
            Some(ScoutError::AiResponseEmpty)
        ));
    }

    #[tokio::test]
    async fn non_json_content_is_invalid() {
        let mut chat = MockChatModel::new();
        chat.expect_complete()
            .returning(|_, _| Ok(Some("I could not find any places.".to_string())));

        let extractor = PlaceExtractor::with_chat(Box::new(chat));
        let err = extractor.extract_places("transcript").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ScoutError>(),
            Some(ScoutError::AiResponseInvalid(_))
        ));
    }

    #[test]
    fn fence_stripping_is_idempotent() {
        let fenced = "```json\n{\"places\": []}\n```";
        let once = strip_code_fences(fenced);
        assert_eq!(once, "{\"places\": []}");
        assert_eq!(strip_code_fences(once), once);
    }

    #[test]
    fn unfenced_content_passes_through() {
        assert_eq!(strip_code_fences("{\"places\": []}"), "{\"places\": []}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn trailing_fence_is_stripped_on_its_own() {
        assert_eq!(strip_code_fences("{\"places\": []}\n```"), "{\"places\": []}");
    }

    #[test]
    fn unknown_types_collapse_to_other() {
        let content = r#"{"places": [
            {"name": "Wawel", "description": "", "type": "castle"},
            {"name": "Tatry", "description": "", "type": "mountains"},
            {"name": "Somewhere", "description": ""}
        ]}"#;

        let candidates = parse_candidates(content).unwrap();
        assert_eq!(candidates[0].kind, "other");
        assert_eq!(candidates[1].kind, "mountains");
        assert_eq!(candidates[2].kind, "other");
    }

    #[test]
    fn type_matching_is_exact() {
        // Labels are matched verbatim; casing variants are not valid types.
        let candidates =
            parse_candidates(r#"{"places": [{"name": "Krakow", "description": "", "type": "City"}]}"#)
                .unwrap();
        assert_eq!(candidates[0].kind, "other");
    }

    #[test]
    fn missing_places_key_yields_no_candidates() {
        assert!(parse_candidates("{}").unwrap().is_empty());
        assert!(parse_candidates(r#"{"places": []}"#).unwrap().is_empty());
    }

    #[test]
    fn every_label_round_trips() {
        for kind in [
            PlaceType::Park,
            PlaceType::Mountains,
            PlaceType::Sea,
            PlaceType::City,
            PlaceType::Lake,
            PlaceType::Monument,
            PlaceType::Other,
        ] {
            assert_eq!(PlaceType::from_label(kind.as_str()), kind);
        }
    }
}
