pub mod google;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::extract::{PlaceCandidate, PlaceType};
use crate::Result;

/// Geographic point; `(0.0, 0.0)` stands for "location unknown".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A fully assembled place, ready for a map frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: PlaceType,
    pub coordinates: Coordinates,
    pub google_place_id: Option<String>,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub photo_url: Option<String>,
    pub photos: Option<Vec<String>>,
    pub website: Option<String>,
}

/// First geocoding hit for a free-text query.
#[derive(Debug, Clone)]
pub struct GeocodedLocation {
    pub lat: f64,
    pub lng: f64,
    pub place_id: Option<String>,
    pub formatted_address: Option<String>,
}

/// Geocoding and photo lookup backend.
#[async_trait]
pub trait MapsProvider: Send + Sync {
    /// Resolve a free-text place name to a location.
    async fn geocode(&self, address: &str) -> Result<GeocodedLocation>;

    /// Photo URLs for a free-text place query.
    async fn photo_urls(&self, query: &str) -> Result<Vec<String>>;
}

/// Attaches coordinates, addresses and photos to extracted candidates.
pub struct PlaceEnricher {
    provider: Option<Box<dyn MapsProvider>>,
}

impl PlaceEnricher {
    pub fn new(config: &Config) -> Self {
        let provider = config.maps.api_key.clone().map(|key| {
            Box::new(google::GoogleMapsClient::new(key)) as Box<dyn MapsProvider>
        });

        Self { provider }
    }

    #[cfg(test)]
    pub(crate) fn with_provider(provider: Box<dyn MapsProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    #[cfg(test)]
    pub(crate) fn without_provider() -> Self {
        Self { provider: None }
    }

    /// Attach location data to every candidate.
    ///
    /// The output always has the same length and order as the input. A
    /// candidate that cannot be enriched yields a degraded record with the
    /// `(0, 0)` sentinel coordinates instead of dropping out.
    pub async fn enrich(&self, candidates: &[PlaceCandidate]) -> Vec<Place> {
        let Some(provider) = &self.provider else {
            tracing::warn!("No Google Maps API key - returning places without coordinates");
            return candidates
                .iter()
                .enumerate()
                .map(|(index, candidate)| degraded_place(candidate, index))
                .collect();
        };

        tracing::info!("Enriching {} places with Google Maps data", candidates.len());

        let progress = ProgressBar::new(candidates.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap(),
        );

        let mut places = Vec::with_capacity(candidates.len());
        for (index, candidate) in candidates.iter().enumerate() {
            progress.set_message(candidate.name.clone());

            let place = match self.try_enrich(provider.as_ref(), candidate, index).await {
                Ok(place) => place,
                Err(e) => {
                    tracing::warn!("Could not enrich '{}': {}", candidate.name, e);
                    degraded_place(candidate, index)
                }
            };

            places.push(place);
            progress.inc(1);
        }
        progress.finish_and_clear();

        tracing::info!("Enrichment completed: {} places ready", places.len());
        places
    }

    async fn try_enrich(
        &self,
        provider: &dyn MapsProvider,
        candidate: &PlaceCandidate,
        index: usize,
    ) -> Result<Place> {
        if candidate.name.is_empty() {
            anyhow::bail!("candidate has no name");
        }

        let location = provider.geocode(&candidate.name).await?;
        tracing::debug!(
            "Found coordinates for '{}': {}, {}",
            candidate.name,
            location.lat,
            location.lng
        );

        let photos = match provider.photo_urls(&candidate.name).await {
            Ok(photos) => photos,
            Err(e) => {
                tracing::warn!("Photo lookup failed for '{}': {}", candidate.name, e);
                Vec::new()
            }
        };

        let id = location
            .place_id
            .clone()
            .unwrap_or_else(|| synthetic_place_id(index, location.lat));

        Ok(Place {
            id,
            name: candidate.name.clone(),
            description: candidate.description.clone(),
            kind: PlaceType::from_label(&candidate.kind),
            coordinates: Coordinates {
                lat: location.lat,
                lng: location.lng,
            },
            google_place_id: location.place_id,
            address: location.formatted_address,
            rating: None,
            photo_url: photos.first().cloned(),
            photos: Some(photos),
            website: None,
        })
    }
}

/// Stable id for a geocoded place that has no Google place id.
fn synthetic_place_id(index: usize, lat: f64) -> String {
    format!("place_{}_{}", index, (lat * 1000.0).round() as i64)
}

/// Coordinate-less record used when enrichment is impossible.
fn degraded_place(candidate: &PlaceCandidate, index: usize) -> Place {
    Place {
        id: format!("place_{index}"),
        name: candidate.name.clone(),
        description: candidate.description.clone(),
        kind: PlaceType::from_label(&candidate.kind),
        coordinates: Coordinates { lat: 0.0, lng: 0.0 },
        google_place_id: None,
        address: None,
        rating: None,
        photo_url: None,
        photos: Some(Vec::new()),
        website: None,
    }
}
