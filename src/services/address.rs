use crate::constants::DEFAULT_WALKING_SPEED_M_PER_MIN;
use crate::models::{
    AddressDescription, Coordinates, LocatedPosition, NavigationDescription, ShareText,
};
use crate::services::geometry;
use crate::services::zone::ZoneModel;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

const VERY_CLOSE: &[&str] = &[
    "You are right next to {landmark}",
    "You are in front of {landmark}",
    "You are at {landmark}",
];

const CLOSE: &[&str] = &[
    "You are about {distance} from {landmark}",
    "You are {distance} {direction} {landmark}",
    "You are near {landmark}, {distance} away",
];

const MEDIUM: &[&str] = &[
    "You are in {zone}, about {distance} {direction} {landmark}",
    "You are {distance} {direction} {landmark}",
    "You are in {zone}, {direction} {landmark} ({distance})",
];

const FAR: &[&str] = &[
    "You are in {zone}, in the area {direction} {landmark}",
    "You are in {zone}, about {distance} {direction} {landmark}",
    "You are in {zone}, on the {side} side",
];

const OUT_OF_ZONE: &[&str] = &[
    "You are outside {zone}",
    "You are not in the {zone} area",
    "Position outside the {zone} district",
];

const UNKNOWN: &[&str] = &[
    "Determining your position...",
    "Locating you...",
    "Searching for your position...",
];

/// Distance tiers for phrase selection, upper bounds in meters.
const VERY_CLOSE_BELOW_M: f64 = 50.0;
const CLOSE_BELOW_M: f64 = 150.0;
const MEDIUM_BELOW_M: f64 = 400.0;

/// How a phrase is chosen among interchangeable templates.
pub enum PhrasePicker {
    /// Thread-local RNG; production default
    Random,
    /// Reproducible sequence
    Seeded(Mutex<StdRng>),
    /// Always the template at this index (modulo the set length)
    Fixed(usize),
}

impl PhrasePicker {
    pub fn seeded(seed: u64) -> Self {
        PhrasePicker::Seeded(Mutex::new(StdRng::seed_from_u64(seed)))
    }

    fn pick<'a>(&self, templates: &[&'a str]) -> &'a str {
        let chosen = match self {
            PhrasePicker::Random => templates.choose(&mut rand::rng()),
            PhrasePicker::Seeded(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                templates.choose(&mut *rng)
            }
            PhrasePicker::Fixed(index) => templates.get(index % templates.len().max(1)),
        };
        chosen.copied().unwrap_or_default()
    }
}

/// Turns located positions into human-readable descriptions relative to the
/// zone's landmarks.
pub struct AddressGenerator {
    zone: Arc<ZoneModel>,
    picker: PhrasePicker,
    walking_speed_m_per_min: f64,
}

impl AddressGenerator {
    pub fn new(zone: Arc<ZoneModel>) -> Self {
        Self::with_picker(zone, PhrasePicker::Random)
    }

    pub fn with_picker(zone: Arc<ZoneModel>, picker: PhrasePicker) -> Self {
        AddressGenerator {
            zone,
            picker,
            walking_speed_m_per_min: DEFAULT_WALKING_SPEED_M_PER_MIN,
        }
    }

    pub fn with_walking_speed(mut self, walking_speed_m_per_min: f64) -> Self {
        self.walking_speed_m_per_min = walking_speed_m_per_min;
        self
    }

    /// Describe where the user is. Never fails: missing or out-of-zone
    /// positions produce an invalid description instead.
    pub fn generate_address(&self, position: Option<&LocatedPosition>) -> AddressDescription {
        let zone = self.zone.definition();

        let located = match position {
            Some(p) if p.coordinates().is_finite() => p,
            _ => {
                return AddressDescription {
                    main_text: self.picker.pick(UNKNOWN).to_string(),
                    short_text: "Unknown position".to_string(),
                    detailed_text: "Your position could not be determined.".to_string(),
                    ..blank()
                }
            }
        };

        if !located.is_in_zone {
            return AddressDescription {
                main_text: fill(self.picker.pick(OUT_OF_ZONE), &zone.name),
                short_text: "Outside the zone".to_string(),
                detailed_text: format!(
                    "You are currently outside the {} district. This app only covers {}.",
                    zone.name, zone.name
                ),
                is_out_of_zone: true,
                ..blank()
            };
        }

        let landmark = match located.nearest_landmark {
            Some(ref landmark) => landmark,
            None => {
                return AddressDescription {
                    main_text: format!("You are in the {} district", zone.name),
                    short_text: zone.name.clone(),
                    detailed_text: format!(
                        "You are in the {} district, {} commune.",
                        zone.name, zone.commune
                    ),
                    is_valid: true,
                    ..blank()
                }
            }
        };

        let coordinates = located.coordinates();
        let relative = self.zone.relative_position(coordinates, landmark);
        let distance_text = format_distance_label(relative.distance_meters);

        let templates = if relative.distance_meters < VERY_CLOSE_BELOW_M {
            VERY_CLOSE
        } else if relative.distance_meters < CLOSE_BELOW_M {
            CLOSE
        } else if relative.distance_meters < MEDIUM_BELOW_M {
            MEDIUM
        } else {
            FAR
        };

        let main_text = fill(self.picker.pick(templates), &zone.name)
            .replace("{landmark}", &landmark.short_name)
            .replace("{distance}", &distance_text)
            .replace("{direction}", relative.preposition)
            .replace("{side}", relative.direction.label());

        let detailed_text = format!(
            "You are in {}, {} commune, {}. You are about {} {} {}. GPS accuracy: {} meters.",
            zone.name,
            zone.commune,
            zone.city,
            distance_text,
            relative.preposition,
            landmark.display_name,
            located.position.accuracy_meters.round() as i64
        );

        let shareable_text = format!(
            "📍 I am in {} ({}, {}), {} {} {} ({:.6}, {:.6})",
            zone.name,
            zone.commune,
            zone.city,
            distance_text,
            relative.preposition,
            landmark.short_name,
            coordinates.lat,
            coordinates.lng
        );

        AddressDescription {
            main_text,
            short_text: format!("{} from {}", distance_text, landmark.short_name),
            detailed_text,
            shareable_text: Some(shareable_text),
            is_valid: true,
            is_out_of_zone: false,
            landmark_name: Some(landmark.short_name.clone()),
            distance_meters: Some(relative.distance_meters.round()),
            direction_name: Some(relative.direction.name().to_string()),
            coordinates: Some(*coordinates),
        }
    }

    /// Compact one-line location for headers.
    pub fn generate_short_address(&self, position: Option<&LocatedPosition>) -> String {
        let located = match position {
            Some(p) if p.is_in_zone && p.coordinates().is_finite() => p,
            _ => return "Outside the zone".to_string(),
        };

        match (&located.nearest_landmark, located.distance_to_landmark_m) {
            (Some(landmark), Some(distance)) => {
                format!("{} from {}", format_distance_label(distance), landmark.short_name)
            }
            _ => self.zone.name().to_string(),
        }
    }

    pub fn generate_navigation_description(
        &self,
        from: &Coordinates,
        place_name: &str,
        place: &Coordinates,
    ) -> NavigationDescription {
        let distance = geometry::distance_meters(from, place);
        let distance_text = format_distance_label(distance);
        let duration = self.estimate_walking_time(distance);

        NavigationDescription {
            destination: place_name.to_string(),
            description: format!("{} - {} ({} on foot)", place_name, distance_text, duration),
            distance: distance_text,
            duration,
        }
    }

    /// Text for sharing the current location. `None` unless the position
    /// resolves to a landmark-relative description.
    pub fn generate_share_text(&self, position: Option<&LocatedPosition>) -> Option<ShareText> {
        let address = self.generate_address(position);
        let text = address.shareable_text?;
        let coordinates = address.coordinates?;
        let zone = self.zone.definition();

        Some(ShareText {
            full_text: format!(
                "{}\n\n📌 Coordinates: {:.6}, {:.6}\n🗺️ {} district, {}, {}, {}",
                text,
                coordinates.lat,
                coordinates.lng,
                zone.name,
                zone.commune,
                zone.city,
                zone.country
            ),
            text,
        })
    }

    pub fn estimate_walking_time(&self, meters: f64) -> String {
        format_walking_time(meters, self.walking_speed_m_per_min)
    }
}

fn blank() -> AddressDescription {
    AddressDescription {
        main_text: String::new(),
        short_text: String::new(),
        detailed_text: String::new(),
        shareable_text: None,
        is_valid: false,
        is_out_of_zone: false,
        landmark_name: None,
        distance_meters: None,
        direction_name: None,
        coordinates: None,
    }
}

fn fill(template: &str, zone_name: &str) -> String {
    template.replace("{zone}", zone_name)
}

/// Round a distance into a spoken-style label: "a few steps", "~50 m",
/// "350 m", "1.5 km", "15 km".
pub fn format_distance_label(meters: f64) -> String {
    if meters.is_nan() || meters < 50.0 {
        "a few steps".to_string()
    } else if meters < 100.0 {
        "~50 m".to_string()
    } else if meters < 1000.0 {
        format!("{} m", ((meters / 50.0).round() * 50.0) as i64)
    } else if meters < 10_000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{} km", (meters / 1000.0).round() as i64)
    }
}

/// Walking time label at the given pace: "<1 min", "1 min", "12 min", "2h",
/// "1h 15min".
pub fn format_walking_time(meters: f64, speed_m_per_min: f64) -> String {
    let minutes = (meters / speed_m_per_min).round();
    if !(minutes >= 1.0) {
        return "<1 min".to_string();
    }

    let minutes = minutes as u64;
    match minutes {
        1 => "1 min".to_string(),
        m if m < 60 => format!("{} min", m),
        m if m % 60 == 0 => format!("{}h", m / 60),
        m => format!("{}h {}min", m / 60, m % 60),
    }
}
