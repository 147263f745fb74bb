//! Forward geocoding: place name to coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    error::{Result, WeatherError, truncate_body},
    model::Coordinates,
};

/// Nominatim's usage policy asks every client to identify itself.
pub(crate) const USER_AGENT: &str = concat!("weather-cli/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait CoordinateResolver: Send + Sync + Debug {
    /// Every failure is reported as [`WeatherError::LocationNotFound`].
    async fn resolve(&self, location: &str) -> Result<Coordinates>;
}

#[derive(Debug, Clone)]
pub struct NominatimResolver {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimResolver {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }
}

#[async_trait]
impl CoordinateResolver for NominatimResolver {
    async fn resolve(&self, location: &str) -> Result<Coordinates> {
        let url = format!("{}/search", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| WeatherError::location_not_found(location, format!("geocoder unreachable: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            WeatherError::location_not_found(location, format!("failed to read geocoder response: {e}"))
        })?;

        if !status.is_success() {
            return Err(WeatherError::location_not_found(
                location,
                format!("geocoder returned status {status}: {}", truncate_body(&body)),
            ));
        }

        let places: Vec<NominatimPlace> = serde_json::from_str(&body).map_err(|e| {
            WeatherError::location_not_found(location, format!("failed to parse geocoder JSON: {e}"))
        })?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::location_not_found(location, "no matching place"))?;

        let coordinates = parse_coordinates(&place)
            .map_err(|reason| WeatherError::location_not_found(location, reason))?;

        tracing::debug!(
            "Resolved '{}' to {:?} ({}, {})",
            location,
            place.display_name,
            coordinates.latitude,
            coordinates.longitude
        );
        Ok(coordinates)
    }
}

fn parse_coordinates(place: &NominatimPlace) -> std::result::Result<Coordinates, String> {
    let latitude = place
        .lat
        .parse::<f64>()
        .map_err(|e| format!("invalid latitude '{}': {e}", place.lat))?;
    let longitude = place
        .lon
        .parse::<f64>()
        .map_err(|e| format!("invalid longitude '{}': {e}", place.lon))?;

    Ok(Coordinates { latitude, longitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_coordinates() {
        let places: Vec<NominatimPlace> = serde_json::from_str(
            r#"[{"lat":"51.1089776","lon":"17.0326689","display_name":"Wrocław, Poland"}]"#,
        )
        .unwrap();

        let coords = parse_coordinates(&places[0]).unwrap();
        assert_eq!(coords.latitude, 51.1089776);
        assert_eq!(coords.longitude, 17.0326689);
    }

    #[test]
    fn rejects_garbage_coordinates() {
        let place = NominatimPlace {
            lat: "north".into(),
            lon: "17.0".into(),
            display_name: None,
        };

        let err = parse_coordinates(&place).unwrap_err();
        assert!(err.contains("invalid latitude"));
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let resolver = NominatimResolver::new("http://localhost:1234/", Client::new());
        assert_eq!(resolver.base_url, "http://localhost:1234");
    }
}
