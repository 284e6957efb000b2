//! The single active navigation session.
//!
//! `RouteSession` owns at most one `Route`. Every `start_navigation`, `restore`
//! and `stop_navigation` bumps a generation counter; an acquisition that
//! resolves after its generation has moved on is discarded, so a slow request
//! can never overwrite a newer route or resurrect a stopped one.
//!
//! While a replacement route is loading, the previously installed route stays
//! live: fixes keep updating its remaining distance and can still raise its
//! arrival.

pub mod persistence;

use crate::config::NavigationConfig;
use crate::constants::NAVIGATION_EVENT_CAPACITY;
use crate::error::{AppError, Result};
use crate::models::{now_epoch_ms, Coordinates, Position, PositionError, Route};
use crate::services::geometry;
use crate::services::positioning::{PositionProvider, PositionReport};
use crate::services::route_acquisition::RouteAcquisition;
use futures::stream::{BoxStream, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

pub use persistence::{SessionSnapshot, SnapshotStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Loading,
    Active,
}

/// What the display surface is told about the session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationEvent {
    RouteShown {
        route: Route,
    },
    Progress {
        position: Position,
        remaining_distance_m: f64,
    },
    Arrived {
        destination_label: String,
    },
    PositionError {
        code: &'static str,
        message: &'static str,
    },
    Stopped,
}

impl NavigationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NavigationEvent::RouteShown { .. } => "route",
            NavigationEvent::Progress { .. } => "progress",
            NavigationEvent::Arrived { .. } => "arrived",
            NavigationEvent::PositionError { .. } => "position_error",
            NavigationEvent::Stopped => "stopped",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_distance_m: Option<f64>,
    pub arrived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_position: Option<Position>,
}

/// Result of applying one live fix to the active route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavigationProgress {
    pub remaining_distance_m: f64,
    pub arrived: bool,
    /// True only for the fix that triggered the arrival notification
    pub just_arrived: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    /// No navigating snapshot in storage
    Nothing,
    /// Snapshot older than the session TTL; discarded
    Expired,
    /// Display never became ready; snapshot kept for a later restore
    DisplayUnavailable,
    /// A newer navigation request or a stop arrived while waiting
    Superseded,
    Restored(Route),
}

#[derive(Default)]
struct Inner {
    state: SessionState,
    route: Option<Route>,
    arrival_notified: bool,
    remaining_distance_m: Option<f64>,
    last_position: Option<Position>,
    tracker: Option<JoinHandle<()>>,
    /// A snapshot is in storage although nothing is displayed
    pending_snapshot: bool,
}

pub struct RouteSession {
    acquisition: Arc<RouteAcquisition>,
    positions: Arc<dyn PositionProvider>,
    snapshots: SnapshotStore,
    config: NavigationConfig,
    generation: AtomicU64,
    inner: Mutex<Inner>,
    events: broadcast::Sender<NavigationEvent>,
}

impl RouteSession {
    pub fn new(
        acquisition: Arc<RouteAcquisition>,
        positions: Arc<dyn PositionProvider>,
        snapshots: SnapshotStore,
        config: NavigationConfig,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(NAVIGATION_EVENT_CAPACITY);
        Arc::new(RouteSession {
            acquisition,
            positions,
            snapshots,
            config,
            generation: AtomicU64::new(0),
            inner: Mutex::new(Inner::default()),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.events.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Acquire a route and make it the active one, replacing any previous
    /// route. Fails with `ZoneViolation`, or with `Superseded` when a newer
    /// request or a stop overtook this one while it was loading.
    pub async fn start_navigation(
        self: &Arc<Self>,
        origin: Coordinates,
        destination: Coordinates,
        label: &str,
    ) -> Result<Route> {
        let generation = self.next_generation();
        {
            let mut inner = self.inner.lock().await;
            inner.state = SessionState::Loading;
        }

        tracing::info!(
            generation,
            "Navigation requested to '{}' ({:.5}, {:.5})",
            label,
            destination.lat,
            destination.lng
        );

        let result = self
            .acquisition
            .acquire_route(&origin, &destination, label)
            .await;

        let mut inner = self.inner.lock().await;
        if self.generation() != generation {
            tracing::debug!(generation, "Discarding superseded navigation result");
            return Err(AppError::Superseded);
        }

        match result {
            Ok(route) => {
                self.activate(&mut inner, route.clone(), generation).await;
                Ok(route)
            }
            Err(e) => {
                inner.state = if inner.route.is_some() {
                    SessionState::Active
                } else {
                    SessionState::Idle
                };
                Err(e)
            }
        }
    }

    /// Return to Idle, cancel live tracking and clear the persisted snapshot.
    /// Returns false when there was nothing to stop.
    pub async fn stop_navigation(&self) -> bool {
        self.next_generation();
        let mut inner = self.inner.lock().await;

        if inner.state == SessionState::Idle && inner.route.is_none() && !inner.pending_snapshot {
            return false;
        }

        if let Some(tracker) = inner.tracker.take() {
            tracker.abort();
        }
        let had_route = inner.route.take().is_some();
        *inner = Inner::default();

        self.snapshots.clear().await;

        tracing::info!(had_route, "Navigation stopped");
        self.emit(NavigationEvent::Stopped);
        true
    }

    /// Feed one live fix into the installed route. `None` when no route is
    /// installed; a route being replaced is still tracked until the new one
    /// lands.
    pub async fn apply_position(&self, position: &Position) -> Option<NavigationProgress> {
        let mut inner = self.inner.lock().await;
        let (destination, label) = match inner.route {
            Some(ref route) => (route.destination, route.destination_label.clone()),
            None => return None,
        };

        let remaining = geometry::distance_meters(&position.coordinates, &destination);
        inner.remaining_distance_m = Some(remaining);
        inner.last_position = Some(*position);

        self.emit(NavigationEvent::Progress {
            position: *position,
            remaining_distance_m: remaining,
        });

        let just_arrived = remaining < self.config.arrival_radius_m && !inner.arrival_notified;
        if just_arrived {
            inner.arrival_notified = true;
            tracing::info!(remaining_m = remaining, "Arrived at '{}'", label);
            self.emit(NavigationEvent::Arrived {
                destination_label: label,
            });
        }

        Some(NavigationProgress {
            remaining_distance_m: remaining,
            arrived: inner.arrival_notified,
            just_arrived,
        })
    }

    pub async fn view(&self) -> SessionView {
        let inner = self.inner.lock().await;
        SessionView {
            state: inner.state,
            route: inner.route.clone(),
            remaining_distance_m: inner.remaining_distance_m,
            arrived: inner.arrival_notified,
            last_position: inner.last_position,
        }
    }

    /// Bring back a persisted route after a restart. Waits for `display_ready`
    /// at most `display_ready_timeout`; on timeout the snapshot stays stored.
    pub async fn restore<F>(self: &Arc<Self>, display_ready: F) -> RestoreOutcome
    where
        F: Future<Output = ()>,
    {
        let snapshot = match self.snapshots.load().await {
            Some(snapshot) if snapshot.is_navigating => snapshot,
            _ => return RestoreOutcome::Nothing,
        };

        let age_ms = snapshot.age_ms(now_epoch_ms());
        if age_ms > self.config.session_ttl.as_millis() as i64 {
            tracing::info!(age_ms, "Persisted route expired, discarding");
            self.snapshots.clear().await;
            return RestoreOutcome::Expired;
        }

        let generation = self.next_generation();

        if tokio::time::timeout(self.config.display_ready_timeout, display_ready)
            .await
            .is_err()
        {
            tracing::warn!(
                timeout_ms = self.config.display_ready_timeout.as_millis() as u64,
                "Display not ready, persisted route left in storage"
            );
            let mut inner = self.inner.lock().await;
            if self.generation() == generation {
                inner.pending_snapshot = true;
            }
            return RestoreOutcome::DisplayUnavailable;
        }

        let mut inner = self.inner.lock().await;
        if self.generation() != generation {
            return RestoreOutcome::Superseded;
        }

        tracing::info!(
            route_id = %snapshot.route.id,
            age_ms,
            "Restoring persisted route to '{}'",
            snapshot.route.destination_label
        );
        self.activate(&mut inner, snapshot.route.clone(), generation)
            .await;
        RestoreOutcome::Restored(snapshot.route)
    }

    async fn activate(self: &Arc<Self>, inner: &mut Inner, route: Route, generation: u64) {
        if let Some(previous) = inner.tracker.take() {
            previous.abort();
        }

        // Subscribe before spawning so no fix published after activation is missed
        let stream = self.positions.watch();
        let tracker = tokio::spawn(track_positions(Arc::downgrade(self), stream, generation));

        self.snapshots.save(&route).await;

        *inner = Inner {
            state: SessionState::Active,
            remaining_distance_m: Some(geometry::distance_meters(
                &route.origin,
                &route.destination,
            )),
            route: Some(route.clone()),
            tracker: Some(tracker),
            ..Inner::default()
        };

        tracing::info!(
            generation,
            route_id = %route.id,
            fallback = route.is_fallback,
            "Navigation active: {:.0}m to '{}'",
            route.total_distance_meters,
            route.destination_label
        );
        self.emit(NavigationEvent::RouteShown { route });
    }

    fn emit(&self, event: NavigationEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

async fn track_positions(
    weak_session: Weak<RouteSession>,
    mut stream: BoxStream<'static, PositionReport>,
    generation: u64,
) {
    while let Some(report) = stream.next().await {
        let Some(session) = weak_session.upgrade() else {
            break;
        };

        match report {
            Ok(position) => {
                session.apply_position(&position).await;
            }
            Err(e) => session.report_position_error(e),
        }
    }
    tracing::debug!(generation, "Position tracking ended");
}

impl RouteSession {
    fn report_position_error(&self, error: PositionError) {
        tracing::info!(code = error.code(), "Position error during navigation: {}", error);
        self.emit(NavigationEvent::PositionError {
            code: error.code(),
            message: error.user_message(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::embedded_zone;
    use crate::db::MemoryKvStore;
    use crate::services::osrm::{ProviderRoute, RoutingProvider};
    use crate::services::positioning::PositionFeed;
    use crate::services::zone::ZoneModel;
    use async_trait::async_trait;
    use std::time::Duration;

    struct DownProvider;

    #[async_trait]
    impl RoutingProvider for DownProvider {
        async fn walking_route(&self, _: &Coordinates, _: &Coordinates) -> Result<ProviderRoute> {
            Err(AppError::RoutingProvider("offline".to_string()))
        }

        fn provider_name(&self) -> &'static str {
            "down"
        }
    }

    fn session() -> (Arc<RouteSession>, Arc<PositionFeed>) {
        let zone = Arc::new(ZoneModel::new(embedded_zone().unwrap()));
        let acquisition = Arc::new(RouteAcquisition::new(zone, Arc::new(DownProvider)));
        let feed = Arc::new(PositionFeed::new());
        let snapshots = SnapshotStore::new(Arc::new(MemoryKvStore::new()));
        let session = RouteSession::new(
            acquisition,
            feed.clone(),
            snapshots,
            NavigationConfig::default(),
        );
        (session, feed)
    }

    const ORIGIN: Coordinates = Coordinates { lat: 9.5376, lng: -13.6827 };
    const DESTINATION: Coordinates = Coordinates { lat: 9.5444, lng: -13.6764 };

    #[tokio::test]
    async fn starts_idle() {
        let (session, _) = session();
        let view = session.view().await;
        assert_eq!(view.state, SessionState::Idle);
        assert!(view.route.is_none());
        assert!(!session.stop_navigation().await);
    }

    #[tokio::test]
    async fn zone_violation_keeps_idle() {
        let (session, _) = session();
        let outside = Coordinates { lat: 9.60, lng: -13.60 };
        let err = session
            .start_navigation(ORIGIN, outside, "Nowhere")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ZoneViolation { .. }));
        assert_eq!(session.view().await.state, SessionState::Idle);
    }

    #[tokio::test]
    async fn apply_position_requires_installed_route() {
        let (session, _) = session();
        let p = Position::new(9.5444, -13.6764, 5.0).unwrap();
        assert!(session.apply_position(&p).await.is_none());
    }

    #[tokio::test]
    async fn arrival_fires_once() {
        let (session, _) = session();
        let mut events = session.subscribe();
        session
            .start_navigation(ORIGIN, DESTINATION, "UGANC")
            .await
            .unwrap();

        let far = Position::new(9.5400, -13.6800, 5.0).unwrap();
        let near = Position::new(9.5443, -13.6764, 5.0).unwrap();
        let nearer = Position::new(9.5444, -13.6764, 5.0).unwrap();

        let p = session.apply_position(&far).await.unwrap();
        assert!(!p.arrived);
        let p = session.apply_position(&near).await.unwrap();
        assert!(p.just_arrived);
        let p = session.apply_position(&nearer).await.unwrap();
        assert!(p.arrived);
        assert!(!p.just_arrived);
        assert_eq!(p.remaining_distance_m, 0.0);

        let mut arrivals = 0;
        while let Ok(event) = events.try_recv() {
            if let NavigationEvent::Arrived { destination_label } = event {
                assert_eq!(destination_label, "UGANC");
                arrivals += 1;
            }
        }
        assert_eq!(arrivals, 1);
    }

    #[tokio::test]
    async fn new_route_resets_arrival() {
        let (session, _) = session();
        session
            .start_navigation(ORIGIN, DESTINATION, "UGANC")
            .await
            .unwrap();
        let at_destination = Position::new(9.5444, -13.6764, 5.0).unwrap();
        assert!(session.apply_position(&at_destination).await.unwrap().just_arrived);

        session
            .start_navigation(ORIGIN, DESTINATION, "UGANC again")
            .await
            .unwrap();
        assert!(!session.view().await.arrived);
        assert!(session.apply_position(&at_destination).await.unwrap().just_arrived);
    }

    #[tokio::test]
    async fn tracker_follows_feed_until_stop() {
        let (session, feed) = session();
        session
            .start_navigation(ORIGIN, DESTINATION, "UGANC")
            .await
            .unwrap();
        assert_eq!(feed.watcher_count(), 1);

        let fix = Position::new(9.5400, -13.6800, 5.0).unwrap();
        feed.publish(Ok(fix));

        let mut applied = false;
        for _ in 0..50 {
            if session.view().await.last_position == Some(fix) {
                applied = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(applied, "tracker never applied the published fix");

        assert!(session.stop_navigation().await);
        tokio::task::yield_now().await;
        feed.publish(Ok(fix));
        assert_eq!(session.view().await.state, SessionState::Idle);
        assert!(session.view().await.last_position.is_none());
    }

    #[tokio::test]
    async fn position_errors_become_events() {
        let (session, feed) = session();
        let mut events = session.subscribe();
        session
            .start_navigation(ORIGIN, DESTINATION, "UGANC")
            .await
            .unwrap();

        feed.publish(Err(PositionError::Timeout));

        let event = tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                match events.recv().await {
                    Ok(NavigationEvent::PositionError { code, .. }) => return code,
                    Ok(_) => continue,
                    Err(e) => panic!("event channel failed: {}", e),
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(event, "TIMEOUT");
        assert_eq!(session.view().await.state, SessionState::Active);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let (session, _) = session();
        session
            .start_navigation(ORIGIN, DESTINATION, "UGANC")
            .await
            .unwrap();
        assert!(session.stop_navigation().await);
        assert!(!session.stop_navigation().await);
        assert_eq!(session.view().await.state, SessionState::Idle);
    }

    #[tokio::test]
    async fn restore_with_empty_store() {
        let (session, _) = session();
        assert_eq!(
            session.restore(std::future::ready(())).await,
            RestoreOutcome::Nothing
        );
    }

    #[test]
    fn event_names() {
        assert_eq!(NavigationEvent::Stopped.name(), "stopped");
        let json = serde_json::to_value(NavigationEvent::Arrived {
            destination_label: "UGANC".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "arrived");
        assert_eq!(json["destination_label"], "UGANC");
    }
}
