pub mod address;
pub mod alerts;
pub mod geometry;
pub mod navigation;
pub mod osrm;
pub mod places;
pub mod positioning;
pub mod route_acquisition;
pub mod zone;
