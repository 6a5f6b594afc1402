use serde::Deserialize;
use tauri::State;

use crate::models::FollowUpNote;
use crate::services::state::AppState;
use crate::utils::{now_rfc3339, today_stamp};

#[derive(Deserialize)]
pub struct FollowUpPayload {
    pub quote_id: String,
    pub status: String,
    pub note: String,
}

/// Appends a follow-up note against a finalized quote. The quote snapshot
/// itself (summary, revision, history) is never modified here.
#[tauri::command]
pub async fn add_follow_up(
    payload: FollowUpPayload,
    state: State<'_, AppState>,
) -> Result<FollowUpNote, String> {
    if payload.note.trim().is_empty() {
        return Err("Follow-up note is required".to_string());
    }
    if payload.status.trim().is_empty() {
        return Err("Follow-up status is required".to_string());
    }

    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    db.get_finalized_quote(&payload.quote_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "Quote not found".to_string())?;

    let (date, time) = today_stamp();
    let note = FollowUpNote {
        id: uuid::Uuid::new_v4().to_string(),
        quote_id: payload.quote_id,
        status: payload.status.trim().to_string(),
        note: payload.note.trim().to_string(),
        date,
        time,
        created_at: now_rfc3339(),
    };
    db.append_follow_up(&note).map_err(|e| e.to_string())?;
    Ok(note)
}

#[tauri::command]
pub async fn get_follow_ups(
    quote_id: String,
    state: State<'_, AppState>,
) -> Result<Vec<FollowUpNote>, String> {
    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    db.list_follow_ups(&quote_id).map_err(|e| e.to_string())
}
