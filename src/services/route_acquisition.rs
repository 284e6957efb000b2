use crate::cache::{route_cache_key, RouteCache};
use crate::constants::DEFAULT_WALKING_SPEED_M_PER_MIN;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, ManeuverKind, Route, RouteEndpoint, RouteStep};
use crate::services::geometry;
use crate::services::osrm::{ProviderRoute, ProviderStep, RoutingProvider};
use crate::services::zone::ZoneModel;
use std::sync::Arc;
use uuid::Uuid;

/// Turns a navigation request into a `Route`: zone guard, one provider
/// attempt, then the offline cache, then a direct-line compass route.
pub struct RouteAcquisition {
    zone: Arc<ZoneModel>,
    provider: Arc<dyn RoutingProvider>,
    cache: Option<Arc<dyn RouteCache>>,
    walking_speed_m_per_min: f64,
}

impl RouteAcquisition {
    pub fn new(zone: Arc<ZoneModel>, provider: Arc<dyn RoutingProvider>) -> Self {
        RouteAcquisition {
            zone,
            provider,
            cache: None,
            walking_speed_m_per_min: DEFAULT_WALKING_SPEED_M_PER_MIN,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn RouteCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_walking_speed(mut self, walking_speed_m_per_min: f64) -> Self {
        self.walking_speed_m_per_min = walking_speed_m_per_min;
        self
    }

    /// Origin is checked first, so a request with both endpoints outside
    /// reports the origin.
    pub fn check_zone(&self, origin: &Coordinates, destination: &Coordinates) -> Result<()> {
        if !self.zone.is_in_zone(origin) {
            return Err(AppError::ZoneViolation {
                endpoint: RouteEndpoint::Origin,
            });
        }
        if !self.zone.is_in_zone(destination) {
            return Err(AppError::ZoneViolation {
                endpoint: RouteEndpoint::Destination,
            });
        }
        Ok(())
    }

    /// Fails only on a zone violation. Provider failures degrade to a cached
    /// route or a direct-line route.
    pub async fn acquire_route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
        label: &str,
    ) -> Result<Route> {
        self.check_zone(origin, destination)?;

        let cache_key = route_cache_key(origin, destination);

        match self.provider.walking_route(origin, destination).await {
            Ok(provider_route) => {
                let route = normalize_route(provider_route, origin, destination, label);
                tracing::info!(
                    provider = self.provider.provider_name(),
                    distance_m = route.total_distance_meters,
                    steps = route.steps.len(),
                    "Route acquired: {:.0}m, {} steps",
                    route.total_distance_meters,
                    route.steps.len()
                );

                if let Some(ref cache) = self.cache {
                    cache.cache_route(&cache_key, &route).await;
                }

                Ok(route)
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.provider_name(),
                    "Routing provider unavailable, degrading: {}",
                    e
                );

                if let Some(ref cache) = self.cache {
                    if let Some(cached) = cache.get_cached_route(&cache_key).await {
                        tracing::info!("Serving cached route for {}", cache_key);
                        return Ok(Route {
                            id: Uuid::new_v4(),
                            origin: *origin,
                            destination: *destination,
                            destination_label: label.to_string(),
                            is_fallback: false,
                            ..cached
                        });
                    }
                }

                Ok(self.direct_line_route(origin, destination, label))
            }
        }
    }

    /// Straight-line route with a single compass step. Cannot fail.
    pub fn direct_line_route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
        label: &str,
    ) -> Route {
        let distance = geometry::distance_meters(origin, destination);
        let bearing = geometry::bearing_degrees(origin, destination);
        let cardinal = geometry::bearing_to_cardinal(bearing);
        let duration = distance / self.walking_speed_m_per_min * 60.0;

        tracing::info!(
            distance_m = distance,
            bearing = bearing,
            "Direct-line route: {:.0}m heading {}",
            distance,
            cardinal
        );

        Route {
            id: Uuid::new_v4(),
            origin: *origin,
            destination: *destination,
            destination_label: label.to_string(),
            total_distance_meters: distance,
            total_duration_seconds: duration,
            polyline: None,
            steps: vec![RouteStep {
                instruction: format!("Head {}", cardinal.name()),
                street_name: None,
                distance_meters: distance,
                duration_seconds: Some(duration),
                maneuver: None,
                bearing_degrees: Some(bearing),
            }],
            is_fallback: true,
        }
    }
}

fn normalize_route(
    provider_route: ProviderRoute,
    origin: &Coordinates,
    destination: &Coordinates,
    label: &str,
) -> Route {
    Route {
        id: Uuid::new_v4(),
        origin: *origin,
        destination: *destination,
        destination_label: label.to_string(),
        total_distance_meters: provider_route.distance_meters,
        total_duration_seconds: provider_route.duration_seconds,
        polyline: Some(provider_route.geometry),
        steps: provider_route.steps.into_iter().map(normalize_step).collect(),
        is_fallback: false,
    }
}

fn normalize_step(step: ProviderStep) -> RouteStep {
    let maneuver = ManeuverKind::from_provider(&step.maneuver_type, step.modifier.as_deref());
    let street_name = Some(step.street_name.trim().to_string()).filter(|s| !s.is_empty());

    let instruction = match (maneuver, street_name.as_deref()) {
        (Some(kind @ ManeuverKind::Arrive), _) | (Some(kind), None) => {
            kind.instruction().to_string()
        }
        (Some(kind), Some(street)) => format!("{} onto {}", kind.instruction(), street),
        (None, Some(street)) => format!("Continue on {}", street),
        (None, None) => "Continue".to_string(),
    };

    RouteStep {
        instruction,
        street_name,
        distance_meters: step.distance_meters,
        duration_seconds: Some(step.duration_seconds),
        maneuver,
        bearing_degrees: None,
    }
}
