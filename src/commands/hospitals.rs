use serde::Deserialize;
use tauri::State;

use crate::models::Hospital;
use crate::services::state::AppState;
use crate::services::sync;
use crate::utils::now_rfc3339;

#[derive(Deserialize)]
pub struct HospitalPayload {
    pub id: Option<String>,
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[tauri::command]
pub async fn get_hospitals(state: State<'_, AppState>) -> Result<Vec<Hospital>, String> {
    sync::refresh_hospitals(state.inner())
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn save_hospital(
    payload: HospitalPayload,
    state: State<'_, AppState>,
) -> Result<Hospital, String> {
    if payload.name.trim().is_empty() {
        return Err("Hospital Name is required".to_string());
    }
    if payload.address.trim().is_empty() {
        return Err("Hospital Address is required".to_string());
    }

    let now = now_rfc3339();
    let (id, created_at) = match payload.id {
        Some(id) => {
            let existing = {
                let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
                db.get_hospital(&id).map_err(|e| e.to_string())?
            };
            let created_at = existing
                .map(|h| h.created_at)
                .unwrap_or_else(|| now.clone());
            (id, created_at)
        }
        None => (uuid::Uuid::new_v4().to_string(), now.clone()),
    };

    let hospital = Hospital {
        id,
        name: payload.name.trim().to_string(),
        address: payload.address.trim().to_string(),
        city: payload.city,
        contact_person: payload.contact_person,
        phone: payload.phone,
        email: payload.email,
        created_at,
        updated_at: now,
    };

    sync::save_hospital(state.inner(), &hospital)
        .await
        .map_err(|e| e.to_string())?;
    Ok(hospital)
}

#[tauri::command]
pub async fn delete_hospital(id: String, state: State<'_, AppState>) -> Result<(), String> {
    sync::delete_hospital(state.inner(), &id)
        .await
        .map_err(|e| e.to_string())
}
