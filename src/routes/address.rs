use crate::error::{AppError, Result};
use crate::models::{AddressDescription, LocatedPosition, Position, ShareText};
use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub located: LocatedPosition,
    pub address: AddressDescription,
    pub short_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<ShareText>,
}

impl AddressResponse {
    pub fn build(state: &AppState, position: &Position) -> Self {
        let located = state.zone.locate(position);
        AddressResponse {
            address: state.addresses.generate_address(Some(&located)),
            short_address: state.addresses.generate_short_address(Some(&located)),
            share: state.addresses.generate_share_text(Some(&located)),
            located,
        }
    }
}

/// POST /address
/// Describe an arbitrary position without publishing it as a live fix
pub async fn describe_position(
    State(state): State<Arc<AppState>>,
    Json(position): Json<Position>,
) -> Result<Json<AddressResponse>> {
    position.validate().map_err(AppError::InvalidRequest)?;
    Ok(Json(AddressResponse::build(&state, &position)))
}
