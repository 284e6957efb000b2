use crate::error::{AppError, Result};
use crate::models::Coordinates;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// External walking-route service.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// One walking route with full geometry and turn-by-turn steps. Any
    /// failure (network, status, empty or malformed response) is an
    /// `AppError::RoutingProvider`.
    async fn walking_route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<ProviderRoute>;

    fn provider_name(&self) -> &'static str;
}

/// A provider route before normalization.
#[derive(Debug, Clone)]
pub struct ProviderRoute {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub geometry: Vec<Coordinates>,
    pub steps: Vec<ProviderStep>,
}

#[derive(Debug, Clone)]
pub struct ProviderStep {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub street_name: String,
    pub maneuver_type: String,
    pub modifier: Option<String>,
}

/// Client for an OSRM-compatible `/route/v1` endpoint.
#[derive(Clone)]
pub struct OsrmClient {
    client: Client,
    base_url: String,
    profile: String,
}

impl OsrmClient {
    pub fn new(base_url: String, profile: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(OsrmClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            profile,
        })
    }
}

#[async_trait]
impl RoutingProvider for OsrmClient {
    async fn walking_route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<ProviderRoute> {
        // OSRM wants "lng,lat;lng,lat"
        let url = format!(
            "{}/{}/{},{};{},{}",
            self.base_url, self.profile, origin.lng, origin.lat, destination.lng, destination.lat
        );

        tracing::debug!(
            profile = %self.profile,
            "OSRM request: ({:.5}, {:.5}) -> ({:.5}, {:.5})",
            origin.lat, origin.lng, destination.lat, destination.lng
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("alternatives", "false"),
                ("steps", "true"),
                ("geometries", "geojson"),
                ("overview", "full"),
                ("annotations", "true"),
            ])
            .send()
            .await
            .map_err(|e| AppError::RoutingProvider(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = %status, "OSRM HTTP error {}: {}", status, error_text);
            return Err(AppError::RoutingProvider(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: OsrmRouteResponse = response
            .json()
            .await
            .map_err(|e| AppError::RoutingProvider(format!("Failed to parse response: {}", e)))?;

        if body.code != "Ok" {
            return Err(AppError::RoutingProvider(format!(
                "OSRM returned {}: {}",
                body.code,
                body.message.unwrap_or_default()
            )));
        }

        let route = body
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| AppError::RoutingProvider("No routes found".to_string()))?;

        let geometry = match route.geometry.value {
            geojson::Value::LineString(line) => line
                .iter()
                .map(|position| match position.as_slice() {
                    [lng, lat, ..] => Ok(Coordinates { lat: *lat, lng: *lng }),
                    _ => Err(AppError::RoutingProvider(
                        "Malformed geometry position".to_string(),
                    )),
                })
                .collect::<Result<Vec<_>>>()?,
            _ => {
                return Err(AppError::RoutingProvider(
                    "Route geometry is not a LineString".to_string(),
                ))
            }
        };

        let steps = route
            .legs
            .into_iter()
            .next()
            .map(|leg| leg.steps)
            .unwrap_or_default()
            .into_iter()
            .map(|step| ProviderStep {
                distance_meters: step.distance,
                duration_seconds: step.duration,
                street_name: step.name,
                maneuver_type: step.maneuver.maneuver_type,
                modifier: step.maneuver.modifier,
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            distance_m = route.distance,
            duration_s = route.duration,
            path_points = geometry.len(),
            steps = steps.len(),
            "OSRM response: {:.0}m, {:.0}s, {} path points",
            route.distance, route.duration, geometry.len()
        );

        Ok(ProviderRoute {
            distance_meters: route.distance,
            duration_seconds: route.duration,
            geometry,
            steps,
        })
    }

    fn provider_name(&self) -> &'static str {
        "osrm"
    }
}

// OSRM API response types

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: geojson::Geometry,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
struct OsrmStep {
    distance: f64,
    duration: f64,
    #[serde(default)]
    name: String,
    maneuver: OsrmManeuver,
}

#[derive(Debug, Deserialize)]
struct OsrmManeuver {
    #[serde(rename = "type")]
    maneuver_type: String,
    #[serde(default)]
    modifier: Option<String>,
}
