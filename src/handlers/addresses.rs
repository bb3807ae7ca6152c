use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::AddressRecord;
use crate::state::AppState;

// GET /api/addresses/:user — pass-through listing for the address picker.
// The booking core only ever keeps the chosen record's `_id`.
pub async fn list_addresses(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<AddressRecord>>, AppError> {
    let addresses = state
        .address_api
        .list_addresses(&user_id)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    Ok(Json(addresses))
}
