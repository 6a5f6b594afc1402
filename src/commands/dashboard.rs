use crate::models::QuoteRecord;
use crate::services::state::AppState;
use chrono::{Datelike, Local};
use serde::Serialize;
use tauri::State;

#[derive(Serialize)]
pub struct DashboardStats {
    pub hospital_count: u32,
    pub instrument_count: u32,
    pub quote_count: u32,
    pub quoted_value_month: f64,
    pub recent_quotes: Vec<QuoteRecord>,
}

#[tauri::command]
pub async fn get_dashboard_stats(
    year_month: Option<String>,
    state: State<'_, AppState>,
) -> Result<DashboardStats, String> {
    let now = Local::now();
    let current_year_month =
        year_month.unwrap_or_else(|| format!("{}-{:02}", now.year(), now.month()));

    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;

    let hospital_count = db.count_hospitals().map_err(|e| e.to_string())?;
    let instrument_count = db.count_instruments().map_err(|e| e.to_string())?;
    let quote_count = db.count_quotes().map_err(|e| e.to_string())?;
    let quoted_value_month = db
        .monthly_quoted_total(&current_year_month)
        .map_err(|e| e.to_string())?;
    let recent_quotes = db.recent_quotes(5).map_err(|e| e.to_string())?;

    Ok(DashboardStats {
        hospital_count,
        instrument_count,
        quote_count,
        quoted_value_month,
        recent_quotes,
    })
}
