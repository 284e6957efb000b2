use crate::models::{Coordinates, Landmark};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A raw reading from the device location provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    #[serde(flatten)]
    pub coordinates: Coordinates,
    #[serde(default = "default_accuracy")]
    pub accuracy_meters: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_degrees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
    #[serde(default = "now_epoch_ms")]
    pub captured_at_epoch_ms: i64,
}

fn default_accuracy() -> f64 {
    crate::constants::DEFAULT_ACCURACY_METERS
}

impl Position {
    /// Validated position captured now.
    pub fn new(lat: f64, lng: f64, accuracy_meters: f64) -> Result<Self, String> {
        let coordinates = Coordinates::new(lat, lng)?;
        if !accuracy_meters.is_finite() || accuracy_meters < 0.0 {
            return Err(format!("Invalid accuracy: {}", accuracy_meters));
        }
        Ok(Self::at(coordinates, accuracy_meters))
    }

    pub fn at(coordinates: Coordinates, accuracy_meters: f64) -> Self {
        Position {
            coordinates,
            accuracy_meters,
            altitude: None,
            heading_degrees: None,
            speed_mps: None,
            captured_at_epoch_ms: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        Coordinates::new(self.coordinates.lat, self.coordinates.lng).map(|_| ())
    }
}

/// A position enriched with zone context. Recomputed for every raw reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatedPosition {
    #[serde(flatten)]
    pub position: Position,
    pub is_in_zone: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_landmark: Option<Landmark>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_to_landmark_m: Option<f64>,
}

impl LocatedPosition {
    pub fn coordinates(&self) -> &Coordinates {
        &self.position.coordinates
    }
}

/// Failure reported by the live position provider.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timed out waiting for a position")]
    Timeout,
    #[error("geolocation is not supported on this device")]
    Unsupported,
}

impl PositionError {
    pub fn code(&self) -> &'static str {
        match self {
            PositionError::PermissionDenied => "PERMISSION_DENIED",
            PositionError::PositionUnavailable => "POSITION_UNAVAILABLE",
            PositionError::Timeout => "TIMEOUT",
            PositionError::Unsupported => "UNSUPPORTED",
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            PositionError::PermissionDenied => {
                "Location access was refused. Please allow it in your settings."
            }
            PositionError::PositionUnavailable => "Position unavailable. Check your GPS.",
            PositionError::Timeout => {
                "Timed out. Try again somewhere with better reception."
            }
            PositionError::Unsupported => "Your device does not support geolocation.",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}) ±{:.0}m",
            self.coordinates.lat, self.coordinates.lng, self.accuracy_meters
        )
    }
}

impl FromStr for PositionError {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "PERMISSION_DENIED" => Ok(PositionError::PermissionDenied),
            "POSITION_UNAVAILABLE" => Ok(PositionError::PositionUnavailable),
            "TIMEOUT" => Ok(PositionError::Timeout),
            "UNSUPPORTED" => Ok(PositionError::Unsupported),
            _ => Err(format!("Unknown position error code: '{}'", s)),
        }
    }
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_epoch_ms() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
