use crate::models::Settings;
use crate::services::state::AppState;
use serde::Deserialize;
use tauri::State;

#[derive(Deserialize)]
pub struct SettingsPayload {
    pub remote_base_url: Option<String>,
    pub remote_api_key: Option<String>,
    pub quote_prefix: Option<String>,
}

#[tauri::command]
pub async fn get_settings(state: State<'_, AppState>) -> Result<Settings, String> {
    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;

    let remote_base_url = db.get_setting("remote_base_url").map_err(|e| e.to_string())?;
    let remote_api_key = db.get_setting("remote_api_key").map_err(|e| e.to_string())?;
    let quote_prefix = db
        .get_setting("quote_prefix")
        .map_err(|e| e.to_string())?
        .unwrap_or_else(|| "QT".to_string());
    Ok(Settings {
        remote_base_url,
        remote_api_key,
        quote_prefix,
    })
}

#[tauri::command]
pub async fn save_settings(
    payload: SettingsPayload,
    state: State<'_, AppState>,
) -> Result<(), String> {
    {
        let db = state.db.lock().map_err(|_| "DB lock".to_string())?;

        if let Some(value) = payload.remote_base_url.clone() {
            db.set_setting("remote_base_url", value.trim())
                .map_err(|e| e.to_string())?;
        }
        if let Some(value) = payload.remote_api_key.clone() {
            if !value.trim().is_empty() {
                db.set_setting("remote_api_key", value.trim())
                    .map_err(|e| e.to_string())?;
            }
        }
        if let Some(value) = payload.quote_prefix.clone() {
            if !value.trim().is_empty() {
                db.set_setting("quote_prefix", value.trim())
                    .map_err(|e| e.to_string())?;
            }
        }
    }

    let settings = get_settings(state.clone()).await.map_err(|e| e.to_string())?;
    state.update_settings(settings).map_err(|e| e.to_string())?;

    Ok(())
}
