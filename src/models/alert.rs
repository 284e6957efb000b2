use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Info,
    Warning,
    Danger,
    Success,
}

/// Circle an alert applies to. A missing radius means the default radius.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AlertArea {
    #[serde(flatten)]
    pub center: Coordinates,
    #[serde(default, rename = "radius", skip_serializing_if = "Option::is_none")]
    pub radius_m: Option<f64>,
}

/// A local notice: road works, a closed market, a welcome message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<AlertArea>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Alert {
    /// Enabled, and `now` lies within `[start_date, end_date]`.
    pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
        self.active && self.start_date <= now && now <= self.end_date
    }
}

/// An active alert whose area contains the user.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyAlert {
    #[serde(flatten)]
    pub alert: Alert,
    pub distance_meters: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn alert_json() -> &'static str {
        r#"{
            "id": "works-corniche",
            "type": "warning",
            "title": "Travaux",
            "message": "Chaussée rétrécie",
            "location": {"lat": 9.5390, "lng": -13.6800, "radius": 200},
            "start_date": "2026-03-01T00:00:00Z",
            "end_date": "2026-03-31T23:59:59Z"
        }"#
    }

    #[test]
    fn test_defaults_when_absent() {
        let alert: Alert = serde_json::from_str(alert_json()).unwrap();
        assert_eq!(alert.kind, AlertKind::Warning);
        assert_eq!(alert.priority, 0);
        assert!(alert.active);
        assert_eq!(alert.location.unwrap().radius_m, Some(200.0));
        assert!(alert.source.is_none());
    }

    #[test]
    fn test_active_window_is_inclusive() {
        let mut alert: Alert = serde_json::from_str(alert_json()).unwrap();
        assert!(alert.is_active_at(datetime!(2026-03-01 00:00:00 UTC)));
        assert!(alert.is_active_at(datetime!(2026-03-31 23:59:59 UTC)));
        assert!(!alert.is_active_at(datetime!(2026-04-01 00:00:00 UTC)));
        assert!(!alert.is_active_at(datetime!(2026-02-28 12:00:00 UTC)));

        alert.active = false;
        assert!(!alert.is_active_at(datetime!(2026-03-15 12:00:00 UTC)));
    }

    #[test]
    fn test_dates_serialize_as_rfc3339() {
        let alert: Alert = serde_json::from_str(alert_json()).unwrap();
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "warning");
        assert_eq!(json["start_date"], "2026-03-01T00:00:00Z");
        assert_eq!(json["location"]["radius"], 200.0);
    }
}
