use crate::models::Coordinates;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkCategory {
    Health,
    Education,
    Sport,
    Commerce,
    Religious,
    Landmark,
}

/// Named reference point used for human-readable addressing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    pub id: String,
    pub display_name: String,
    pub short_name: String,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub category: LandmarkCategory,
    /// Lower is more important.
    pub importance_rank: u8,
}

/// Closed ring of vertices bounding the zone. First and last vertex coincide.
///
/// Serialized as `[[lat, lng], ...]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct ZonePolygon {
    vertices: Vec<Coordinates>,
}

impl ZonePolygon {
    pub fn new(vertices: Vec<Coordinates>) -> Result<Self, String> {
        if vertices.len() < 4 {
            return Err(format!(
                "Zone polygon needs at least 4 vertices (closed triangle), got {}",
                vertices.len()
            ));
        }
        for v in &vertices {
            Coordinates::new(v.lat, v.lng)?;
        }
        let (first, last) = (vertices[0], vertices[vertices.len() - 1]);
        if first != last {
            return Err(format!(
                "Zone polygon is not closed: first vertex ({}, {}) != last vertex ({}, {})",
                first.lat, first.lng, last.lat, last.lng
            ));
        }
        Ok(ZonePolygon { vertices })
    }

    pub fn vertices(&self) -> &[Coordinates] {
        &self.vertices
    }
}

impl TryFrom<Vec<[f64; 2]>> for ZonePolygon {
    type Error = String;

    fn try_from(ring: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        ZonePolygon::new(
            ring.into_iter()
                .map(|[lat, lng]| Coordinates { lat, lng })
                .collect(),
        )
    }
}

impl From<ZonePolygon> for Vec<[f64; 2]> {
    fn from(polygon: ZonePolygon) -> Self {
        polygon.vertices.iter().map(|c| [c.lat, c.lng]).collect()
    }
}

/// Static description of the single neighborhood the app serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDefinition {
    pub name: String,
    pub commune: String,
    pub city: String,
    pub country: String,
    pub center: Coordinates,
    pub polygon: ZonePolygon,
    pub landmarks: Vec<Landmark>,
}

impl ZoneDefinition {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let zone: ZoneDefinition =
            serde_json::from_str(json).map_err(|e| format!("Invalid zone definition: {}", e))?;
        zone.validate()?;
        Ok(zone)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.landmarks.is_empty() {
            return Err("Zone definition must declare at least one landmark".to_string());
        }
        for landmark in &self.landmarks {
            Coordinates::new(landmark.coordinates.lat, landmark.coordinates.lng)
                .map_err(|e| format!("Landmark '{}': {}", landmark.id, e))?;
        }
        Ok(())
    }
}
