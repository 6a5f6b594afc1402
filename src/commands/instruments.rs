use serde::Deserialize;
use tauri::State;

use crate::models::Instrument;
use crate::services::state::AppState;
use crate::services::sync;
use crate::utils::now_rfc3339;

#[derive(Deserialize)]
pub struct InstrumentPayload {
    pub id: Option<String>,
    pub name: String,
    pub catalog_code: Option<String>,
    pub hsn_code: Option<String>,
    pub gst_type: Option<String>,
    pub gst_percent: Option<f64>,
    pub unit_price: f64,
}

#[tauri::command]
pub async fn get_instruments(state: State<'_, AppState>) -> Result<Vec<Instrument>, String> {
    sync::refresh_instruments(state.inner())
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn save_instrument(
    payload: InstrumentPayload,
    state: State<'_, AppState>,
) -> Result<Instrument, String> {
    if payload.name.trim().is_empty() {
        return Err("Instrument Name is required".to_string());
    }
    if payload.unit_price < 0.0 {
        return Err("Unit Price cannot be negative".to_string());
    }

    let now = now_rfc3339();
    let (id, created_at) = match payload.id {
        Some(id) => {
            let existing = {
                let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
                db.get_instrument(&id).map_err(|e| e.to_string())?
            };
            let created_at = existing
                .map(|i| i.created_at)
                .unwrap_or_else(|| now.clone());
            (id, created_at)
        }
        None => (uuid::Uuid::new_v4().to_string(), now.clone()),
    };

    let instrument = Instrument {
        id,
        name: payload.name.trim().to_string(),
        catalog_code: payload.catalog_code,
        hsn_code: payload.hsn_code,
        gst_type: payload.gst_type,
        gst_percent: payload.gst_percent,
        unit_price: payload.unit_price,
        created_at,
        updated_at: now,
    };

    sync::save_instrument(state.inner(), &instrument)
        .await
        .map_err(|e| e.to_string())?;
    Ok(instrument)
}

#[tauri::command]
pub async fn delete_instrument(id: String, state: State<'_, AppState>) -> Result<(), String> {
    sync::delete_instrument(state.inner(), &id)
        .await
        .map_err(|e| e.to_string())
}
