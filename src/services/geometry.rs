//! Pure geometric primitives on WGS84 coordinates.
//!
//! None of these validate their inputs: out-of-range or non-finite coordinates
//! propagate NaN instead of failing. Validate at the caller boundary
//! (`Coordinates::new`, `Position::new`).

use crate::constants::EARTH_RADIUS_METERS;
use crate::models::Coordinates;
use serde::Serialize;
use std::fmt;

/// Great-circle (haversine) distance in meters.
pub fn distance_meters(a: &Coordinates, b: &Coordinates) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Initial bearing from `from` toward `to`, in [0, 360) degrees clockwise from
/// true north.
pub fn bearing_degrees(from: &Coordinates, to: &Coordinates) -> f64 {
    let delta_lng = (to.lng - from.lng).to_radians();
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinal {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

const CARDINALS: [Cardinal; 8] = [
    Cardinal::North,
    Cardinal::NorthEast,
    Cardinal::East,
    Cardinal::SouthEast,
    Cardinal::South,
    Cardinal::SouthWest,
    Cardinal::West,
    Cardinal::NorthWest,
];

impl Cardinal {
    /// Canonical lowercase name, e.g. `north-east`.
    pub fn name(&self) -> &'static str {
        match self {
            Cardinal::North => "north",
            Cardinal::NorthEast => "north-east",
            Cardinal::East => "east",
            Cardinal::SouthEast => "south-east",
            Cardinal::South => "south",
            Cardinal::SouthWest => "south-west",
            Cardinal::West => "west",
            Cardinal::NorthWest => "north-west",
        }
    }

    /// Capitalized label, e.g. `North-East`.
    pub fn label(&self) -> &'static str {
        match self {
            Cardinal::North => "North",
            Cardinal::NorthEast => "North-East",
            Cardinal::East => "East",
            Cardinal::SouthEast => "South-East",
            Cardinal::South => "South",
            Cardinal::SouthWest => "South-West",
            Cardinal::West => "West",
            Cardinal::NorthWest => "North-West",
        }
    }

    /// Relative phrase placed before a landmark name, e.g. `to the north-east of`.
    pub fn preposition(&self) -> &'static str {
        match self {
            Cardinal::North => "to the north of",
            Cardinal::NorthEast => "to the north-east of",
            Cardinal::East => "to the east of",
            Cardinal::SouthEast => "to the south-east of",
            Cardinal::South => "to the south of",
            Cardinal::SouthWest => "to the south-west of",
            Cardinal::West => "to the west of",
            Cardinal::NorthWest => "to the north-west of",
        }
    }
}

impl fmt::Display for Cardinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Map a bearing onto one of 8 buckets, each 45° wide, inclusive at the lower
/// edge and exclusive at the upper edge, starting at -22.5°. Both
/// [337.5, 360) and [0, 22.5) are north. Bearings outside [0, 360) are
/// normalized first; NaN maps to north.
pub fn bearing_to_cardinal(bearing: f64) -> Cardinal {
    let normalized = bearing.rem_euclid(360.0);
    let index = ((normalized + 22.5) / 45.0).floor() as usize % 8;
    CARDINALS[index]
}

/// Even-odd ray casting test against a closed, simple ring.
///
/// Points lying exactly on an edge (vertices included) are reported as
/// outside, so the answer on the boundary does not depend on ring orientation
/// or on which edge the ray happens to graze.
pub fn is_point_in_polygon(point: &Coordinates, ring: &[Coordinates]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let (x, y) = (point.lng, point.lat);
    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].lng, ring[i].lat);
        let (xj, yj) = (ring[j].lng, ring[j].lat);

        if on_segment(x, y, xi, yi, xj, yj) {
            return false;
        }

        if (yi > y) != (yj > y) {
            let x_cross = (xj - xi) * (y - yi) / (yj - yi) + xi;
            if x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

fn on_segment(x: f64, y: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
    let cross = (x2 - x1) * (y - y1) - (y2 - y1) * (x - x1);
    if cross != 0.0 {
        return false;
    }
    x >= x1.min(x2) && x <= x1.max(x2) && y >= y1.min(y2) && y <= y1.max(y2)
}
