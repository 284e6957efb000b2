use crate::models::{Coordinates, Place, PlaceCategory, PlaceMatch};
use serde::Deserialize;
use std::collections::HashSet;

/// Category and free-text filters for a place listing. Both are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceFilter {
    pub category: Option<PlaceCategory>,
    pub q: Option<String>,
}

#[derive(Deserialize)]
struct PlacesFile {
    places: Vec<Place>,
}

/// The essential places of the zone. Immutable once loaded.
pub struct PlaceCatalog {
    places: Vec<Place>,
}

impl PlaceCatalog {
    pub fn new(places: Vec<Place>) -> Result<Self, String> {
        let mut ids = HashSet::new();
        for place in &places {
            if !ids.insert(place.id.as_str()) {
                return Err(format!("Duplicate place id '{}'", place.id));
            }
            Coordinates::new(place.coordinates.lat, place.coordinates.lng)
                .map_err(|e| format!("Place '{}': {}", place.id, e))?;
        }

        tracing::info!(places = places.len(), "Place catalog loaded");
        Ok(PlaceCatalog { places })
    }

    /// Parse `{"places": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: PlacesFile =
            serde_json::from_str(json).map_err(|e| format!("Invalid places file: {}", e))?;
        Self::new(file.places)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    /// Places passing `filter`. Sorted nearest first when `from` is known,
    /// otherwise in catalog order.
    pub fn search(&self, filter: &PlaceFilter, from: Option<&Coordinates>) -> Vec<PlaceMatch> {
        let query = filter
            .q
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let places = self.places.iter().filter(|place| {
            filter.category.map_or(true, |c| place.category == c)
                && query.as_deref().map_or(true, |q| place.matches(q))
        });
        ranked(places, from)
    }

    /// The `limit` places closest to `from`.
    pub fn nearest(&self, from: &Coordinates, limit: usize) -> Vec<PlaceMatch> {
        let mut places = ranked(self.places.iter(), Some(from));
        places.truncate(limit);
        places
    }

    /// Health and security places, nearest first when `from` is known.
    pub fn emergency(&self, from: Option<&Coordinates>) -> Vec<PlaceMatch> {
        ranked(
            self.places.iter().filter(|p| p.category.is_emergency()),
            from,
        )
    }

    /// One place by id, with its distance from `from` when known.
    pub fn describe(&self, id: &str, from: Option<&Coordinates>) -> Option<PlaceMatch> {
        self.get(id).map(|place| place_match(place, from))
    }
}

fn place_match(place: &Place, from: Option<&Coordinates>) -> PlaceMatch {
    PlaceMatch {
        place: place.clone(),
        category_label: place.category.label(),
        distance_meters: from.map(|from| from.distance_to(&place.coordinates)),
    }
}

fn ranked<'a>(
    places: impl Iterator<Item = &'a Place>,
    from: Option<&Coordinates>,
) -> Vec<PlaceMatch> {
    let mut matches: Vec<PlaceMatch> = places.map(|place| place_match(place, from)).collect();

    if from.is_some() {
        // Stable, so equidistant places keep catalog order
        matches.sort_by(|a, b| {
            let a = a.distance_meters.unwrap_or(f64::INFINITY);
            let b = b.distance_meters.unwrap_or(f64::INFINITY);
            a.total_cmp(&b)
        });
    }
    matches
}
