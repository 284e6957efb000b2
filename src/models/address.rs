use crate::models::Coordinates;
use serde::Serialize;

/// Human-readable description of where the user is. Regenerated on every
/// position update and never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AddressDescription {
    pub main_text: String,
    pub short_text: String,
    pub detailed_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shareable_text: Option<String>,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_out_of_zone: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShareText {
    pub text: String,
    pub full_text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NavigationDescription {
    pub destination: String,
    pub distance: String,
    pub duration: String,
    pub description: String,
}
