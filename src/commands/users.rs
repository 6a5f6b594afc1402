use serde::{Deserialize, Serialize};
use tauri::State;

use crate::models::{StaffUser, UserRole};
use crate::services::state::AppState;
use crate::utils::now_rfc3339;

#[derive(Deserialize)]
pub struct UserPayload {
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct LandingPage {
    pub email: String,
    pub role: UserRole,
    pub page: String,
}

/// Role lookup for the signed-in operator; the front end navigates to the
/// returned page.
#[tauri::command]
pub async fn resolve_landing_page(
    email: String,
    state: State<'_, AppState>,
) -> Result<LandingPage, String> {
    let email = email.trim().to_lowercase();
    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    let user = db
        .get_user(&email)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("No role configured for {}", email))?;

    Ok(LandingPage {
        email: user.email,
        role: user.role,
        page: user.role.landing_page().to_string(),
    })
}

#[tauri::command]
pub async fn list_users(state: State<'_, AppState>) -> Result<Vec<StaffUser>, String> {
    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    db.list_users().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn save_user(payload: UserPayload, state: State<'_, AppState>) -> Result<StaffUser, String> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if payload.name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    let role: UserRole = payload.role.parse()?;

    let now = now_rfc3339();
    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    let created_at = db
        .get_user(&email)
        .map_err(|e| e.to_string())?
        .map(|u| u.created_at)
        .unwrap_or_else(|| now.clone());

    let user = StaffUser {
        email,
        name: payload.name.trim().to_string(),
        role,
        created_at,
        updated_at: now,
    };
    db.upsert_user(&user).map_err(|e| e.to_string())?;
    Ok(user)
}

#[tauri::command]
pub async fn delete_user(email: String, state: State<'_, AppState>) -> Result<(), String> {
    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    db.delete_user(&email.trim().to_lowercase())
        .map_err(|e| e.to_string())
}
