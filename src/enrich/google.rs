use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GeocodedLocation, MapsProvider};
use crate::{utils, Result};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const PLACE_SEARCH_URL: &str = "https://places.googleapis.com/v1/places:searchText";
const PHOTO_BASE_URL: &str = "https://places.googleapis.com/v1";
const PLACE_FIELD_MASK: &str = "places.id,places.displayName,places.photos";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_PHOTOS: usize = 10;
const PHOTO_MAX_WIDTH_PX: u32 = 400;

/// Google Maps client covering the Geocoding API and the Places API (New).
pub struct GoogleMapsClient {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
    place_id: Option<String>,
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    #[serde(rename = "textQuery")]
    text_query: &'a str,
    #[serde(rename = "maxResultCount")]
    max_result_count: u8,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    places: Vec<SearchPlace>,
}

#[derive(Debug, Deserialize)]
struct SearchPlace {
    #[serde(default)]
    photos: Vec<PhotoReference>,
}

#[derive(Debug, Deserialize)]
struct PhotoReference {
    name: Option<String>,
}

impl GoogleMapsClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key }
    }

    /// Media URL for a photo resource name, sized for list views.
    fn photo_media_url(&self, photo_name: &str) -> String {
        format!(
            "{PHOTO_BASE_URL}/{photo_name}/media?maxWidthPx={PHOTO_MAX_WIDTH_PX}&key={}",
            urlencoding::encode(&self.api_key)
        )
    }
}

#[async_trait]
impl MapsProvider for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<GeocodedLocation> {
        let response = self
            .client
            .get(GEOCODE_URL)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Geocoding API returned HTTP {status}");
        }

        let parsed: GeocodeResponse = response.json().await?;
        if parsed.status != "OK" {
            anyhow::bail!(
                "Geocoding API error: {} ({})",
                parsed.status,
                parsed.error_message.as_deref().unwrap_or("no details")
            );
        }

        let result = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("no geocoding results for '{address}'"))?;

        Ok(GeocodedLocation {
            lat: result.geometry.location.lat,
            lng: result.geometry.location.lng,
            place_id: result.place_id,
            formatted_address: result.formatted_address,
        })
    }

    async fn photo_urls(&self, query: &str) -> Result<Vec<String>> {
        let request = SearchRequest {
            text_query: query,
            max_result_count: 1,
        };

        let response = self
            .client
            .post(PLACE_SEARCH_URL)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", PLACE_FIELD_MASK)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Places API returned HTTP {status}: {}",
                utils::preview(&body, 200)
            );
        }

        let parsed: SearchResponse = response.json().await?;
        let Some(place) = parsed.places.into_iter().next() else {
            tracing::debug!("No Places API results for '{}'", query);
            return Ok(Vec::new());
        };

        let urls: Vec<String> = place
            .photos
            .iter()
            .take(MAX_PHOTOS)
            .filter_map(|photo| photo.name.as_deref())
            .map(|name| self.photo_media_url(name))
            .collect();

        tracing::debug!("Generated {} photo URLs for '{}'", urls.len(), query);
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_media_urls_carry_size_and_key() {
        let client = GoogleMapsClient::new("test key".to_string());
        let url = client.photo_media_url("places/ChIJabc/photos/AUc123");

        assert_eq!(
            url,
            "https://places.googleapis.com/v1/places/ChIJabc/photos/AUc123/media?maxWidthPx=400&key=test%20key"
        );
    }

    #[test]
    fn parses_a_geocode_response() {
        let json = r#"{
            "status": "OK",
            "results": [
                {
                    "formatted_address": "Warsaw, Poland",
                    "place_id": "ChIJAZ-GmmbMHkcR_NPqiCq-8HI",
                    "geometry": {
                        "location": {"lat": 52.2296756, "lng": 21.0122287}
                    }
                }
            ]
        }"#;

        let parsed: GeocodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, "OK");
        assert_eq!(parsed.results[0].geometry.location.lat, 52.2296756);
        assert_eq!(
            parsed.results[0].place_id.as_deref(),
            Some("ChIJAZ-GmmbMHkcR_NPqiCq-8HI")
        );
    }

    #[test]
    fn parses_a_zero_results_response() {
        let parsed: GeocodeResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert_eq!(parsed.status, "ZERO_RESULTS");
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn search_request_uses_the_wire_field_names() {
        let request = SearchRequest {
            text_query: "Morskie Oko",
            max_result_count: 1,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["textQuery"], "Morskie Oko");
        assert_eq!(json["maxResultCount"], 1);
    }

    #[test]
    fn parses_search_responses_with_and_without_photos() {
        let json = r#"{
            "places": [
                {
                    "id": "ChIJabc",
                    "displayName": {"text": "Morskie Oko"},
                    "photos": [
                        {"name": "places/ChIJabc/photos/AUc1"},
                        {"name": "places/ChIJabc/photos/AUc2"}
                    ]
                }
            ]
        }"#;

        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.places[0].photos.len(), 2);

        let parsed: SearchResponse =
            serde_json::from_str(r#"{"places": [{"id": "ChIJabc"}]}"#).unwrap();
        assert!(parsed.places[0].photos.is_empty());

        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.places.is_empty());
    }
}
