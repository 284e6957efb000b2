use crate::models::{Coordinates, Landmark, LocatedPosition, Position, ZoneDefinition};
use crate::services::geometry::{self, Cardinal};
use geo::{BoundingRect, LineString, Rect};
use serde::Serialize;

/// Nearest-landmark lookup result.
#[derive(Debug, Clone, Copy)]
pub struct LandmarkMatch<'a> {
    pub landmark: &'a Landmark,
    pub distance_meters: f64,
}

/// Where a point sits relative to a landmark. Bearing is measured from the
/// landmark toward the point, so `North` reads "to the north of <landmark>".
#[derive(Debug, Clone, Serialize)]
pub struct RelativePosition {
    pub distance_meters: f64,
    pub bearing_degrees: f64,
    pub direction: Cardinal,
    pub preposition: &'static str,
    pub landmark: String,
}

/// The fixed zone polygon and landmark set. Immutable once constructed.
pub struct ZoneModel {
    definition: ZoneDefinition,
    bounds: Option<Rect<f64>>,
}

impl ZoneModel {
    pub fn new(definition: ZoneDefinition) -> Self {
        let ring: LineString<f64> = definition
            .polygon
            .vertices()
            .iter()
            .map(|c| (c.lng, c.lat))
            .collect::<Vec<_>>()
            .into();
        let bounds = ring.bounding_rect();

        tracing::info!(
            zone = %definition.name,
            vertices = definition.polygon.vertices().len(),
            landmarks = definition.landmarks.len(),
            "Zone model loaded: {} ({} vertices, {} landmarks)",
            definition.name,
            definition.polygon.vertices().len(),
            definition.landmarks.len()
        );

        ZoneModel { definition, bounds }
    }

    pub fn definition(&self) -> &ZoneDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.definition.landmarks
    }

    pub fn is_in_zone(&self, point: &Coordinates) -> bool {
        if let Some(bounds) = self.bounds {
            let (min, max) = (bounds.min(), bounds.max());
            if point.lng < min.x || point.lng > max.x || point.lat < min.y || point.lat > max.y {
                return false;
            }
        }
        geometry::is_point_in_polygon(point, self.definition.polygon.vertices())
    }

    /// Closest landmark by great-circle distance. On an exact distance tie the
    /// landmark with the lower importance rank wins, then the first declared.
    pub fn nearest_landmark(&self, point: &Coordinates) -> Option<LandmarkMatch<'_>> {
        let mut best: Option<LandmarkMatch<'_>> = None;

        for landmark in &self.definition.landmarks {
            let distance = geometry::distance_meters(point, &landmark.coordinates);
            let better = match best {
                None => true,
                Some(ref current) => {
                    distance < current.distance_meters
                        || (distance == current.distance_meters
                            && landmark.importance_rank < current.landmark.importance_rank)
                }
            };
            if better {
                best = Some(LandmarkMatch {
                    landmark,
                    distance_meters: distance,
                });
            }
        }

        best
    }

    /// Attach zone membership and nearest landmark to a raw reading.
    pub fn locate(&self, position: &Position) -> LocatedPosition {
        let is_in_zone = self.is_in_zone(&position.coordinates);
        let nearest = self.nearest_landmark(&position.coordinates);

        tracing::debug!(
            lat = position.coordinates.lat,
            lng = position.coordinates.lng,
            in_zone = is_in_zone,
            landmark = nearest.map(|m| m.landmark.id.as_str()),
            "Position located"
        );

        LocatedPosition {
            position: *position,
            is_in_zone,
            nearest_landmark: nearest.map(|m| m.landmark.clone()),
            distance_to_landmark_m: nearest.map(|m| m.distance_meters),
        }
    }

    pub fn relative_position(&self, point: &Coordinates, landmark: &Landmark) -> RelativePosition {
        let distance_meters = geometry::distance_meters(point, &landmark.coordinates);
        let bearing_degrees = geometry::bearing_degrees(&landmark.coordinates, point);
        let direction = geometry::bearing_to_cardinal(bearing_degrees);

        RelativePosition {
            distance_meters,
            bearing_degrees,
            direction,
            preposition: direction.preposition(),
            landmark: landmark.short_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::embedded_zone;
    use crate::models::{LandmarkCategory, ZonePolygon};

    fn camayenne() -> ZoneModel {
        ZoneModel::new(embedded_zone().unwrap())
    }

    fn landmark(id: &str, lat: f64, lng: f64, rank: u8) -> Landmark {
        Landmark {
            id: id.to_string(),
            display_name: id.to_uppercase(),
            short_name: id.to_string(),
            coordinates: Coordinates { lat, lng },
            category: LandmarkCategory::Landmark,
            importance_rank: rank,
        }
    }

    fn square_zone(landmarks: Vec<Landmark>) -> ZoneModel {
        let polygon = ZonePolygon::try_from(vec![
            [0.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [1.0, 0.0],
            [0.0, 0.0],
        ])
        .unwrap();
        ZoneModel::new(ZoneDefinition {
            name: "Square".to_string(),
            commune: "C".to_string(),
            city: "X".to_string(),
            country: "Y".to_string(),
            center: Coordinates { lat: 0.5, lng: 0.5 },
            polygon,
            landmarks,
        })
    }

    #[test]
    fn test_known_points_inside_zone() {
        let zone = camayenne();
        assert!(zone.is_in_zone(&Coordinates { lat: 9.5376, lng: -13.6827 }));
        assert!(zone.is_in_zone(&Coordinates { lat: 9.5444, lng: -13.6764 }));
        assert!(zone.is_in_zone(&zone.definition().center.clone()));
        for lm in zone.landmarks() {
            assert!(zone.is_in_zone(&lm.coordinates), "{} should be inside", lm.id);
        }
    }

    #[test]
    fn test_far_points_outside_zone() {
        let zone = camayenne();
        // Kaloum peninsula tip, downtown Conakry
        assert!(!zone.is_in_zone(&Coordinates { lat: 9.5092, lng: -13.7122 }));
        assert!(!zone.is_in_zone(&Coordinates { lat: 48.8566, lng: 2.3522 }));
        assert!(!zone.is_in_zone(&Coordinates { lat: 9.60, lng: -13.60 }));
    }

    #[test]
    fn test_nearest_landmark_at_landmark() {
        let zone = camayenne();
        let m = zone
            .nearest_landmark(&Coordinates { lat: 9.5458, lng: -13.6729 })
            .unwrap();
        assert_eq!(m.landmark.id, "stade");
        assert_eq!(m.distance_meters, 0.0);
    }

    #[test]
    fn test_nearest_landmark_tie_prefers_importance() {
        let zone = square_zone(vec![
            landmark("west", 0.5, 0.4, 3),
            landmark("east", 0.5, 0.6, 1),
        ]);
        let m = zone.nearest_landmark(&Coordinates { lat: 0.5, lng: 0.5 }).unwrap();
        assert_eq!(m.landmark.id, "east");
    }

    #[test]
    fn test_nearest_landmark_full_tie_keeps_declaration_order() {
        let zone = square_zone(vec![
            landmark("first", 0.5, 0.4, 2),
            landmark("second", 0.5, 0.6, 2),
        ]);
        let m = zone.nearest_landmark(&Coordinates { lat: 0.5, lng: 0.5 }).unwrap();
        assert_eq!(m.landmark.id, "first");
    }

    #[test]
    fn test_nearest_landmark_empty_set() {
        let zone = square_zone(vec![]);
        assert!(zone.nearest_landmark(&Coordinates { lat: 0.5, lng: 0.5 }).is_none());
    }

    #[test]
    fn test_locate_enriches_position() {
        let zone = camayenne();
        let position = Position::new(9.5376, -13.6827, 8.0).unwrap();
        let located = zone.locate(&position);
        assert!(located.is_in_zone);
        assert_eq!(located.nearest_landmark.unwrap().id, "donka");
        assert_eq!(located.distance_to_landmark_m, Some(0.0));

        let outside = zone.locate(&Position::new(9.60, -13.60, 8.0).unwrap());
        assert!(!outside.is_in_zone);
        assert!(outside.nearest_landmark.is_some());
    }

    #[test]
    fn test_relative_position_direction_from_landmark() {
        let zone = camayenne();
        let donka = zone.landmarks()[0].clone();
        // ~100 m due north of Donka
        let rel = zone.relative_position(&Coordinates { lat: 9.5385, lng: -13.6827 }, &donka);
        assert_eq!(rel.direction, Cardinal::North);
        assert_eq!(rel.preposition, "to the north of");
        assert!((rel.distance_meters - 100.0).abs() < 1.0);
        assert_eq!(rel.landmark, "Hôpital Donka");
    }
}
