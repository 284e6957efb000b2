use crate::constants::{POSITION_FEED_CAPACITY, STORE_KEY_LAST_POSITION};
use crate::db::KeyValueStore;
use crate::models::{LocatedPosition, Position, PositionError};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::broadcast;

/// One report from the device: a fix or a failure code.
pub type PositionReport = Result<Position, PositionError>;

/// Source of device positions.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Resolve a single position.
    async fn current_position(&self) -> PositionReport;

    /// Continuous updates. Dropping the stream unsubscribes.
    fn watch(&self) -> BoxStream<'static, PositionReport>;
}

/// Push-driven provider: the device (over HTTP) publishes reports and any
/// number of watchers receive them.
pub struct PositionFeed {
    sender: broadcast::Sender<PositionReport>,
    latest: RwLock<Option<PositionReport>>,
}

impl PositionFeed {
    pub fn new() -> Self {
        Self::with_capacity(POSITION_FEED_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        PositionFeed {
            sender,
            latest: RwLock::new(None),
        }
    }

    /// Record a report and fan it out. Returns how many watchers received it.
    pub fn publish(&self, report: PositionReport) -> usize {
        match self.latest.write() {
            Ok(mut latest) => *latest = Some(report),
            Err(poisoned) => *poisoned.into_inner() = Some(report),
        }

        match &report {
            Ok(position) => tracing::debug!(
                lat = position.coordinates.lat,
                lng = position.coordinates.lng,
                accuracy_m = position.accuracy_meters,
                "Position fix {}",
                position
            ),
            Err(e) => tracing::info!(code = e.code(), "Position error reported: {}", e),
        }

        self.sender.send(report).unwrap_or(0)
    }

    pub fn latest(&self) -> Option<PositionReport> {
        match self.latest.read() {
            Ok(latest) => *latest,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn watcher_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for PositionFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PositionProvider for PositionFeed {
    async fn current_position(&self) -> PositionReport {
        self.latest()
            .unwrap_or(Err(PositionError::PositionUnavailable))
    }

    fn watch(&self) -> BoxStream<'static, PositionReport> {
        let receiver = self.sender.subscribe();
        stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(report) => return Some((report, receiver)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Only the most recent fix matters
                        tracing::debug!(skipped, "Position watcher lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

/// Keeps the device's last fix in the key-value store, so a position is
/// known right after a restart. Best effort: store failures are logged.
#[derive(Clone)]
pub struct LastPositionStore {
    store: Arc<dyn KeyValueStore>,
}

impl LastPositionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        LastPositionStore { store }
    }

    pub async fn save(&self, position: &Position) {
        let json = match serde_json::to_string(position) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize last position: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(STORE_KEY_LAST_POSITION, &json).await {
            tracing::warn!("Failed to persist last position: {}", e);
        }
    }

    /// `None` when nothing is stored or the store fails. An unreadable
    /// entry is removed.
    pub async fn load(&self) -> Option<Position> {
        let json = match self.store.get(STORE_KEY_LAST_POSITION).await {
            Ok(json) => json?,
            Err(e) => {
                tracing::warn!("Failed to read last position: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Position>(&json) {
            Ok(position) if position.validate().is_ok() => Some(position),
            _ => {
                tracing::warn!("Discarding unreadable last position");
                if let Err(e) = self.store.remove(STORE_KEY_LAST_POSITION).await {
                    tracing::warn!("Failed to clear last position: {}", e);
                }
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneTransition {
    pub entered: bool,
}

/// Remembers the last zone membership and reports changes. Starts as
/// "outside", so the first in-zone fix counts as entering.
#[derive(Default)]
pub struct ZoneTracker {
    in_zone: Mutex<bool>,
}

impl ZoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, located: &LocatedPosition) -> Option<ZoneTransition> {
        let mut in_zone = self
            .in_zone
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if *in_zone == located.is_in_zone {
            return None;
        }
        *in_zone = located.is_in_zone;

        tracing::info!(
            entered = located.is_in_zone,
            "Zone membership changed: {}",
            if located.is_in_zone { "entered" } else { "left" }
        );
        Some(ZoneTransition {
            entered: located.is_in_zone,
        })
    }
}
