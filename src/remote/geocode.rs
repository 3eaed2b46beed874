//! Reverse geocoding for points of interest.
//!
//! Lookups are best effort: any transport or decoding trouble falls back
//! to a plain coordinate label instead of failing the caller.

use serde::Deserialize;

use crate::config::GeocodeConfig;

/// Fallback label for a coordinate pair with no resolvable place name.
pub fn coordinate_label(lat: f64, lon: f64) -> String {
    format!("Location at {:.4}, {:.4}", lat, lon)
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<ReverseAddress>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ReverseAddress {
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

/// Most specific available name: village, then town, then city, then the
/// full display name.
fn pick_name(response: &ReverseResponse) -> Option<String> {
    let address = response.address.as_ref();
    address
        .and_then(|a| a.village.clone())
        .or_else(|| address.and_then(|a| a.town.clone()))
        .or_else(|| address.and_then(|a| a.city.clone()))
        .or_else(|| response.display_name.clone())
        .filter(|name| !name.is_empty())
}

/// Best-effort reverse geocoder backed by a Nominatim endpoint.
pub struct ReverseGeocoder {
    http: reqwest::Client,
    config: GeocodeConfig,
}

impl ReverseGeocoder {
    pub fn new(http: reqwest::Client, config: GeocodeConfig) -> Self {
        Self { http, config }
    }

    /// Resolve a place name for the coordinates, falling back to a
    /// coordinate label on any failure.
    pub async fn locate(&self, lat: f64, lon: f64) -> String {
        match self.lookup(lat, lon).await {
            Ok(response) => {
                pick_name(&response).unwrap_or_else(|| coordinate_label(lat, lon))
            }
            Err(error) => {
                log::warn!(
                    "reverse geocoding failed for {:.4}, {:.4}: {}",
                    lat,
                    lon,
                    error
                );
                coordinate_label(lat, lon)
            }
        }
    }

    async fn lookup(&self, lat: f64, lon: f64) -> Result<ReverseResponse, reqwest::Error> {
        self.http
            .get(&self.config.url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
            ])
            // Nominatim rejects requests without an identifying user agent
            .header(reqwest::header::USER_AGENT, "bloomwatch/0.1")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> ReverseResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_village_wins_over_broader_names() {
        let response = decode(
            r#"{
                "address": {"village": "Alpens", "town": "Vic", "city": "Barcelona"},
                "display_name": "Alpens, Osona, Barcelona, Spain"
            }"#,
        );
        assert_eq!(pick_name(&response).as_deref(), Some("Alpens"));
    }

    #[test]
    fn test_falls_through_to_city_and_display_name() {
        let response = decode(r#"{"address": {"city": "Barcelona"}}"#);
        assert_eq!(pick_name(&response).as_deref(), Some("Barcelona"));

        let response = decode(r#"{"display_name": "Somewhere remote"}"#);
        assert_eq!(pick_name(&response).as_deref(), Some("Somewhere remote"));
    }

    #[test]
    fn test_empty_response_yields_no_name() {
        let response = decode("{}");
        assert_eq!(pick_name(&response), None);
    }

    #[test]
    fn test_coordinate_label_formatting() {
        assert_eq!(coordinate_label(41.38742, 2.16852), "Location at 41.3874, 2.1685");
        assert_eq!(coordinate_label(-3.70379, -60.02513), "Location at -3.7038, -60.0251");
    }
}
