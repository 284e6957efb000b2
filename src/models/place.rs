use crate::models::Coordinates;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Health,
    Security,
    Admin,
    Transport,
    Leisure,
    Religious,
}

impl PlaceCategory {
    /// French label shown next to the place.
    pub fn label(&self) -> &'static str {
        match self {
            PlaceCategory::Health => "Santé",
            PlaceCategory::Security => "Sécurité",
            PlaceCategory::Admin => "Administration",
            PlaceCategory::Transport => "Transport",
            PlaceCategory::Leisure => "Loisirs",
            PlaceCategory::Religious => "Religieux",
        }
    }

    /// Health and security places are listed first in an emergency.
    pub fn is_emergency(&self) -> bool {
        matches!(self, PlaceCategory::Health | PlaceCategory::Security)
    }

    fn as_str(&self) -> &'static str {
        match self {
            PlaceCategory::Health => "health",
            PlaceCategory::Security => "security",
            PlaceCategory::Admin => "admin",
            PlaceCategory::Transport => "transport",
            PlaceCategory::Leisure => "leisure",
            PlaceCategory::Religious => "religious",
        }
    }
}

/// An essential place of the neighborhood: hospital, police, stop, ...
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub category: PlaceCategory,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Lower is more important.
    pub importance: u8,
}

impl Place {
    /// Case-insensitive substring match on the names, category, description
    /// and address. `query` must already be lowercased and trimmed.
    pub fn matches(&self, query: &str) -> bool {
        let contains = |text: &str| text.to_lowercase().contains(query);
        contains(&self.name)
            || contains(&self.short_name)
            || self.category.as_str().contains(query)
            || self.description.as_deref().is_some_and(contains)
            || self.address.as_deref().is_some_and(contains)
    }
}

/// A place as listed to the user, with its distance when a position is known.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceMatch {
    #[serde(flatten)]
    pub place: Place,
    pub category_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}
