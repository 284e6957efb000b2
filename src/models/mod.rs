pub mod address;
pub mod alert;
pub mod coordinates;
pub mod place;
pub mod position;
pub mod route;
pub mod zone;

pub use address::{AddressDescription, NavigationDescription, ShareText};
pub use alert::{Alert, AlertArea, AlertKind, NearbyAlert};
pub use coordinates::Coordinates;
pub use place::{Place, PlaceCategory, PlaceMatch};
pub use position::{now_epoch_ms, LocatedPosition, Position, PositionError};
pub use route::{ManeuverKind, NavigationRequest, Route, RouteEndpoint, RouteStep};
pub use zone::{Landmark, LandmarkCategory, ZoneDefinition, ZonePolygon};
