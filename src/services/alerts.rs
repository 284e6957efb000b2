use crate::constants::DEFAULT_ALERT_RADIUS_METERS;
use crate::models::{Alert, Coordinates, NearbyAlert};
use serde::Deserialize;
use std::collections::HashSet;
use time::OffsetDateTime;

#[derive(Deserialize)]
struct AlertsFile {
    alerts: Vec<Alert>,
}

/// Local alerts, loaded once. Activity is evaluated at query time.
pub struct AlertBoard {
    alerts: Vec<Alert>,
}

impl AlertBoard {
    pub fn new(alerts: Vec<Alert>) -> Result<Self, String> {
        let mut ids = HashSet::new();
        for alert in &alerts {
            if !ids.insert(alert.id.as_str()) {
                return Err(format!("Duplicate alert id '{}'", alert.id));
            }
            if alert.end_date < alert.start_date {
                return Err(format!("Alert '{}' ends before it starts", alert.id));
            }
            if let Some(area) = alert.location {
                Coordinates::new(area.center.lat, area.center.lng)
                    .map_err(|e| format!("Alert '{}': {}", alert.id, e))?;
                if area.radius_m.is_some_and(|r| !(r.is_finite() && r > 0.0)) {
                    return Err(format!("Alert '{}' has a non-positive radius", alert.id));
                }
            }
        }

        tracing::info!(alerts = alerts.len(), "Alert board loaded");
        Ok(AlertBoard { alerts })
    }

    /// Parse `{"alerts": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: AlertsFile =
            serde_json::from_str(json).map_err(|e| format!("Invalid alerts file: {}", e))?;
        Self::new(file.alerts)
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Alerts active at `now`, highest priority first. Equal priorities keep
    /// file order.
    pub fn active_at(&self, now: OffsetDateTime) -> Vec<Alert> {
        let mut active: Vec<Alert> = self
            .alerts
            .iter()
            .filter(|a| a.is_active_at(now))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.priority.cmp(&a.priority));
        active
    }

    /// Active alerts whose area contains `from`. Alerts without a location
    /// never match.
    pub fn nearby(&self, from: &Coordinates, now: OffsetDateTime) -> Vec<NearbyAlert> {
        self.active_at(now)
            .into_iter()
            .filter_map(|alert| {
                let area = alert.location?;
                let distance_meters = from.distance_to(&area.center);
                let radius = area.radius_m.unwrap_or(DEFAULT_ALERT_RADIUS_METERS);
                (distance_meters <= radius).then_some(NearbyAlert {
                    alert,
                    distance_meters,
                })
            })
            .collect()
    }
}
