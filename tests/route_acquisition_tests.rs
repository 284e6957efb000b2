mod common;

use camayenne_nav::cache::{route_cache_key, MemoryRouteCache, RouteCache, StoredRouteCache};
use camayenne_nav::db::MemoryKvStore;
use camayenne_nav::error::AppError;
use camayenne_nav::models::{ManeuverKind, RouteEndpoint};
use camayenne_nav::services::geometry::{self, Cardinal};
use camayenne_nav::services::route_acquisition::RouteAcquisition;
use common::{FailingStore, MockProvider, DESTINATION, ORIGIN, OUTSIDE};
use std::sync::Arc;

#[tokio::test]
async fn zone_violation_on_origin_makes_no_provider_call() {
    let provider = MockProvider::succeeding();
    let acquisition = RouteAcquisition::new(common::zone(), provider.clone());

    let err = acquisition
        .acquire_route(&OUTSIDE, &DESTINATION, "UGANC")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::ZoneViolation {
            endpoint: RouteEndpoint::Origin
        }
    ));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn zone_violation_on_destination_makes_no_provider_call() {
    let provider = MockProvider::failing();
    let acquisition = RouteAcquisition::new(common::zone(), provider.clone());

    let err = acquisition
        .acquire_route(&ORIGIN, &OUTSIDE, "Somewhere")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::ZoneViolation {
            endpoint: RouteEndpoint::Destination
        }
    ));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn provider_route_is_normalized() {
    let provider = MockProvider::succeeding();
    let acquisition = RouteAcquisition::new(common::zone(), provider.clone());

    let route = acquisition
        .acquire_route(&ORIGIN, &DESTINATION, "UGANC")
        .await
        .unwrap();

    assert_eq!(provider.calls(), 1);
    assert!(!route.is_fallback);
    assert_eq!(route.destination_label, "UGANC");
    assert_eq!(route.total_distance_meters, 1450.0);
    assert_eq!(route.polyline.as_ref().map(Vec::len), Some(3));
    assert_eq!(route.steps.len(), 3);
    assert_eq!(route.steps[0].instruction, "Depart onto Route de Donka");
    assert_eq!(route.steps[1].maneuver, Some(ManeuverKind::TurnRight));
    assert_eq!(route.steps[1].instruction, "Turn right onto Corniche Nord");
    assert_eq!(route.steps[2].instruction, "Arrive at destination");
}

#[tokio::test]
async fn provider_failure_falls_back_to_direct_line() {
    let provider = MockProvider::failing();
    let acquisition = RouteAcquisition::new(common::zone(), provider.clone());

    let route = acquisition
        .acquire_route(&ORIGIN, &DESTINATION, "UGANC")
        .await
        .unwrap();

    assert_eq!(provider.calls(), 1);
    assert!(route.is_fallback);
    assert!(route.polyline.is_none());
    let expected = geometry::distance_meters(&ORIGIN, &DESTINATION);
    assert!((route.total_distance_meters - expected).abs() < 1e-9);
}

/// Origin and destination inside Camayenne, provider down: the walker gets a
/// compass route instead of an error.
#[tokio::test]
async fn end_to_end_offline_navigation() {
    let acquisition = RouteAcquisition::new(common::zone(), MockProvider::failing());

    let route = acquisition
        .acquire_route(&ORIGIN, &DESTINATION, "Université UGANC")
        .await
        .unwrap();

    let distance = geometry::distance_meters(&ORIGIN, &DESTINATION);
    assert!(route.is_fallback);
    assert!((route.total_distance_meters - distance).abs() < 1e-6);
    assert!((route.total_duration_seconds - distance / 80.0 * 60.0).abs() < 1e-6);
    assert!((route.total_distance_meters - 1024.0).abs() < 10.0);

    assert_eq!(route.steps.len(), 1);
    let step = &route.steps[0];
    assert!(step.instruction.contains(Cardinal::NorthEast.name()));
    assert_eq!(step.distance_meters, route.total_distance_meters);
}

#[tokio::test]
async fn cached_route_served_when_provider_goes_down() {
    let provider = MockProvider::succeeding();
    let cache = Arc::new(MemoryRouteCache::new(3600, 100));
    let acquisition =
        RouteAcquisition::new(common::zone(), provider.clone()).with_cache(cache.clone());

    let online = acquisition
        .acquire_route(&ORIGIN, &DESTINATION, "UGANC")
        .await
        .unwrap();
    assert!(cache
        .get_cached_route(&route_cache_key(&ORIGIN, &DESTINATION))
        .await
        .is_some());

    provider.set_failing(true);
    // A few meters away rounds to the same cache key
    let nearby = camayenne_nav::models::Coordinates {
        lat: ORIGIN.lat + 0.00002,
        lng: ORIGIN.lng,
    };
    let offline = acquisition
        .acquire_route(&nearby, &DESTINATION, "University")
        .await
        .unwrap();

    assert_eq!(provider.calls(), 2);
    assert!(!offline.is_fallback);
    assert_ne!(offline.id, online.id);
    assert_eq!(offline.origin, nearby);
    assert_eq!(offline.destination_label, "University");
    assert_eq!(offline.polyline, online.polyline);
    assert_eq!(offline.total_distance_meters, online.total_distance_meters);
}

#[tokio::test]
async fn cache_miss_still_falls_back() {
    let provider = MockProvider::failing();
    let cache = Arc::new(StoredRouteCache::new(Arc::new(MemoryKvStore::new()), 3600, 500));
    let acquisition = RouteAcquisition::new(common::zone(), provider).with_cache(cache.clone());

    let route = acquisition
        .acquire_route(&ORIGIN, &DESTINATION, "UGANC")
        .await
        .unwrap();

    assert!(route.is_fallback);
    let stats = cache.get_stats().await;
    assert_eq!(stats.misses, 1);
    // Direct-line routes are never cached
    assert!(cache
        .get_cached_route(&route_cache_key(&ORIGIN, &DESTINATION))
        .await
        .is_none());
}

#[tokio::test]
async fn broken_cache_store_does_not_block_provider_route() {
    let provider = MockProvider::succeeding();
    let cache = Arc::new(StoredRouteCache::new(Arc::new(FailingStore), 3600, 500));
    let acquisition =
        RouteAcquisition::new(common::zone(), provider.clone()).with_cache(cache.clone());

    let route = acquisition
        .acquire_route(&ORIGIN, &DESTINATION, "UGANC")
        .await
        .unwrap();

    assert_eq!(provider.calls(), 1);
    assert!(!route.is_fallback);
    assert_eq!(route.total_distance_meters, 1450.0);
    assert!(!cache.get_stats().await.connected);
}

#[tokio::test]
async fn broken_cache_store_still_falls_back_to_direct_line() {
    let provider = MockProvider::failing();
    let cache = Arc::new(StoredRouteCache::new(Arc::new(FailingStore), 3600, 500));
    let acquisition = RouteAcquisition::new(common::zone(), provider).with_cache(cache.clone());

    let route = acquisition
        .acquire_route(&ORIGIN, &DESTINATION, "UGANC")
        .await
        .unwrap();

    assert!(route.is_fallback);
    assert_eq!(route.steps.len(), 1);
    let distance = geometry::distance_meters(&ORIGIN, &DESTINATION);
    assert!((route.total_distance_meters - distance).abs() < 1e-6);
    assert_eq!(cache.get_stats().await.misses, 1);
}
