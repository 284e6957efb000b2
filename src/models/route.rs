use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which end of a navigation request a check refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RouteEndpoint {
    Origin,
    Destination,
}

impl fmt::Display for RouteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteEndpoint::Origin => write!(f, "origin"),
            RouteEndpoint::Destination => write!(f, "destination"),
        }
    }
}

/// Normalized turn-by-turn instruction type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ManeuverKind {
    Depart,
    Arrive,
    TurnLeft,
    TurnRight,
    SlightLeft,
    SlightRight,
    SharpLeft,
    SharpRight,
    UTurn,
    Continue,
    Roundabout,
    ForkLeft,
    ForkRight,
    EndOfRoadLeft,
    EndOfRoadRight,
}

impl ManeuverKind {
    /// Map a provider maneuver `type` / `modifier` pair onto the fixed vocabulary.
    /// Returns `None` for maneuvers outside it (merges, ramps, name changes...).
    pub fn from_provider(maneuver_type: &str, modifier: Option<&str>) -> Option<Self> {
        match (maneuver_type, modifier) {
            ("depart", _) => Some(ManeuverKind::Depart),
            ("arrive", _) => Some(ManeuverKind::Arrive),
            ("turn", Some("left")) => Some(ManeuverKind::TurnLeft),
            ("turn", Some("right")) => Some(ManeuverKind::TurnRight),
            ("turn", Some("slight left")) => Some(ManeuverKind::SlightLeft),
            ("turn", Some("slight right")) => Some(ManeuverKind::SlightRight),
            ("turn", Some("sharp left")) => Some(ManeuverKind::SharpLeft),
            ("turn", Some("sharp right")) => Some(ManeuverKind::SharpRight),
            ("turn", Some("uturn")) => Some(ManeuverKind::UTurn),
            ("turn", Some("straight")) => Some(ManeuverKind::Continue),
            ("continue", _) => Some(ManeuverKind::Continue),
            ("roundabout", _) | ("rotary", _) => Some(ManeuverKind::Roundabout),
            ("fork", Some("left")) | ("fork", Some("slight left")) => Some(ManeuverKind::ForkLeft),
            ("fork", Some("right")) | ("fork", Some("slight right")) => {
                Some(ManeuverKind::ForkRight)
            }
            ("end of road", Some("left")) => Some(ManeuverKind::EndOfRoadLeft),
            ("end of road", Some("right")) => Some(ManeuverKind::EndOfRoadRight),
            _ => None,
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            ManeuverKind::Depart => "Depart",
            ManeuverKind::Arrive => "Arrive at destination",
            ManeuverKind::TurnLeft => "Turn left",
            ManeuverKind::TurnRight => "Turn right",
            ManeuverKind::SlightLeft => "Bear slightly left",
            ManeuverKind::SlightRight => "Bear slightly right",
            ManeuverKind::SharpLeft => "Turn sharply left",
            ManeuverKind::SharpRight => "Turn sharply right",
            ManeuverKind::UTurn => "Make a U-turn",
            ManeuverKind::Continue => "Continue straight",
            ManeuverKind::Roundabout => "Enter the roundabout",
            ManeuverKind::ForkLeft => "Keep left at the fork",
            ManeuverKind::ForkRight => "Keep right at the fork",
            ManeuverKind::EndOfRoadLeft => "At the end of the road, turn left",
            ManeuverKind::EndOfRoadRight => "At the end of the road, turn right",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteStep {
    pub instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    pub distance_meters: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maneuver: Option<ManeuverKind>,
    /// Compass bearing to follow; set on direct-line steps only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearing_degrees: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub id: Uuid,
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub destination_label: String,
    pub total_distance_meters: f64,
    pub total_duration_seconds: f64,
    /// Street geometry from the provider; `None` for direct-line routes.
    pub polyline: Option<Vec<Coordinates>>,
    pub steps: Vec<RouteStep>,
    pub is_fallback: bool,
}

impl Route {
    /// Polyline as a GeoJSON LineString (`[lng, lat]` positions).
    pub fn polyline_geojson(&self) -> Option<geojson::Geometry> {
        self.polyline.as_ref().map(|path| {
            geojson::Geometry::new(geojson::Value::LineString(
                path.iter().map(|c| vec![c.lng, c.lat]).collect(),
            ))
        })
    }
}

// Request/Response types for API endpoints

#[derive(Debug, Clone, Deserialize)]
pub struct NavigationRequest {
    pub origin: Coordinates,
    pub destination: Coordinates,
    #[serde(default = "default_label")]
    pub label: String,
}

fn default_label() -> String {
    "Destination".to_string()
}

impl NavigationRequest {
    pub fn validate(&self) -> Result<(), String> {
        Coordinates::new(self.origin.lat, self.origin.lng)
            .map_err(|e| format!("origin: {}", e))?;
        Coordinates::new(self.destination.lat, self.destination.lng)
            .map_err(|e| format!("destination: {}", e))?;
        if self.label.trim().is_empty() {
            return Err("label must not be empty".to_string());
        }
        Ok(())
    }
}
