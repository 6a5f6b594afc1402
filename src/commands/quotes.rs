use std::collections::HashSet;

use serde::Deserialize;
use tauri::State;

use crate::models::{
    AdditionalItem, ConfigItem, FinalizeOutcome, QuoteDetail, QuoteHeader, QuoteLine, QuoteRecord,
};
use crate::services::pricing;
use crate::services::state::AppState;
use crate::services::sync;
use crate::utils::{format_inr, now_rfc3339, today_stamp};

#[derive(Deserialize)]
pub struct QuoteHeaderPayload {
    pub quote_no: String,
    pub quote_date: String,
    pub hospital_name: String,
    pub hospital_address: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub discount: f64,
}

#[derive(Deserialize)]
pub struct QuoteLinePayload {
    pub instrument_id: String,
    pub quantity: Option<u32>,
}

#[derive(Deserialize)]
pub struct ConfigItemPayload {
    pub name: String,
    pub catalog_code: Option<String>,
    pub unit_price: Option<f64>,
}

#[derive(Deserialize)]
pub struct AdditionalItemPayload {
    pub name: String,
    pub catalog_code: Option<String>,
    pub unit_price: f64,
    pub qty: Option<u32>,
}

#[tauri::command]
pub async fn get_quote_header(state: State<'_, AppState>) -> Result<QuoteHeader, String> {
    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    Ok(db
        .get_quote_header()
        .map_err(|e| e.to_string())?
        .unwrap_or_default())
}

/// Updates the header's scalar fields; lines stay as they are.
#[tauri::command]
pub async fn save_quote_header(
    payload: QuoteHeaderPayload,
    state: State<'_, AppState>,
) -> Result<QuoteHeader, String> {
    if payload.discount < 0.0 {
        return Err("Discount cannot be negative".to_string());
    }

    mutate_header(state.inner(), |header| {
        header.quote_no = payload.quote_no.trim().to_string();
        header.quote_date = payload.quote_date.trim().to_string();
        header.hospital_name = payload.hospital_name.trim().to_string();
        header.hospital_address = payload.hospital_address.trim().to_string();
        header.contact_person = payload.contact_person.clone();
        header.contact_phone = payload.contact_phone.clone();
        header.contact_email = payload.contact_email.clone();
        header.terms = payload.terms.clone();
        header.discount = payload.discount;
        Ok(())
    })
}

#[tauri::command]
pub async fn add_quote_line(
    payload: QuoteLinePayload,
    state: State<'_, AppState>,
) -> Result<QuoteHeader, String> {
    let quantity = payload.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err("Quantity must be at least 1".to_string());
    }

    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    db.get_instrument(&payload.instrument_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "Instrument not found in the master catalog".to_string())?;

    let mut header = db
        .get_quote_header()
        .map_err(|e| e.to_string())?
        .unwrap_or_default();
    header.lines.push(QuoteLine {
        instrument_id: payload.instrument_id,
        quantity,
        config_items: vec![],
        additional_items: vec![],
    });
    db.save_quote_header(&header).map_err(|e| e.to_string())?;
    Ok(header)
}

#[tauri::command]
pub async fn update_line_quantity(
    line_index: usize,
    quantity: u32,
    state: State<'_, AppState>,
) -> Result<QuoteHeader, String> {
    if quantity == 0 {
        return Err("Quantity must be at least 1".to_string());
    }
    mutate_header(state.inner(), |header| {
        let line = line_at(header, line_index)?;
        line.quantity = quantity;
        Ok(())
    })
}

#[tauri::command]
pub async fn remove_quote_line(
    line_index: usize,
    state: State<'_, AppState>,
) -> Result<QuoteHeader, String> {
    mutate_header(state.inner(), |header| {
        if line_index >= header.lines.len() {
            return Err("No such quote line".to_string());
        }
        header.lines.remove(line_index);
        Ok(())
    })
}

#[tauri::command]
pub async fn add_config_item(
    line_index: usize,
    payload: ConfigItemPayload,
    state: State<'_, AppState>,
) -> Result<QuoteHeader, String> {
    if payload.name.trim().is_empty() {
        return Err("Item name is required".to_string());
    }
    mutate_header(state.inner(), |header| {
        let line = line_at(header, line_index)?;
        line.config_items.push(ConfigItem {
            name: payload.name.trim().to_string(),
            catalog_code: payload.catalog_code.clone(),
            unit_price: payload.unit_price,
        });
        Ok(())
    })
}

#[tauri::command]
pub async fn remove_config_item(
    line_index: usize,
    item_index: usize,
    state: State<'_, AppState>,
) -> Result<QuoteHeader, String> {
    mutate_header(state.inner(), |header| {
        let line = line_at(header, line_index)?;
        if item_index >= line.config_items.len() {
            return Err("No such configuration item".to_string());
        }
        line.config_items.remove(item_index);
        Ok(())
    })
}

#[tauri::command]
pub async fn add_additional_item(
    line_index: usize,
    payload: AdditionalItemPayload,
    state: State<'_, AppState>,
) -> Result<QuoteHeader, String> {
    if payload.name.trim().is_empty() {
        return Err("Item name is required".to_string());
    }
    if payload.unit_price < 0.0 {
        return Err("Item price cannot be negative".to_string());
    }
    let qty = payload.qty.unwrap_or(1);
    if qty == 0 {
        return Err("Quantity must be at least 1".to_string());
    }

    mutate_header(state.inner(), |header| {
        let line = line_at(header, line_index)?;
        line.additional_items.push(AdditionalItem {
            name: payload.name.trim().to_string(),
            catalog_code: payload.catalog_code.clone(),
            unit_price: payload.unit_price,
            qty,
        });
        Ok(())
    })
}

#[tauri::command]
pub async fn remove_additional_item(
    line_index: usize,
    item_index: usize,
    state: State<'_, AppState>,
) -> Result<QuoteHeader, String> {
    mutate_header(state.inner(), |header| {
        let line = line_at(header, line_index)?;
        if item_index >= line.additional_items.len() {
            return Err("No such additional item".to_string());
        }
        line.additional_items.remove(item_index);
        Ok(())
    })
}

/// Prices the working header, assigns the next revision for its quote
/// number and appends the snapshot to the local history, then mirrors it to
/// the remote store best-effort. The header itself is left untouched, so
/// finalizing again produces the next revision.
#[tauri::command]
pub async fn finalize_quote(state: State<'_, AppState>) -> Result<FinalizeOutcome, String> {
    let (date, time) = today_stamp();

    let finalized = {
        let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
        let header = db
            .get_quote_header()
            .map_err(|e| e.to_string())?
            .unwrap_or_default();
        let catalog = db.list_instruments().map_err(|e| e.to_string())?;
        let revision = db
            .max_revision(&header.quote_no)
            .map_err(|e| e.to_string())?
            + 1;

        let finalized = pricing::finalize_quote(&catalog, &header, revision, date, time)
            .map_err(|e| e.to_string())?;
        db.append_finalized_quote(&finalized, &now_rfc3339())
            .map_err(|e| e.to_string())?;
        finalized
    };

    let remote_synced = sync::mirror_finalized_quote(state.inner(), &finalized).await;

    Ok(FinalizeOutcome {
        quote_no: finalized.header.quote_no.clone(),
        revision: finalized.revision,
        rounded_total: finalized.summary.rounded_total,
        display_total: format_inr(finalized.summary.rounded_total),
        remote_synced,
    })
}

#[tauri::command]
pub async fn get_quote_history(state: State<'_, AppState>) -> Result<Vec<QuoteRecord>, String> {
    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    db.list_quotes().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_quote_detail(
    quote_id: String,
    state: State<'_, AppState>,
) -> Result<QuoteDetail, String> {
    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    let quote = db
        .get_finalized_quote(&quote_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "Quote not found".to_string())?;
    let follow_ups = db.list_follow_ups(&quote_id).map_err(|e| e.to_string())?;
    Ok(QuoteDetail { quote, follow_ups })
}

#[tauri::command]
pub async fn suggest_quote_no(state: State<'_, AppState>) -> Result<String, String> {
    let prefix = {
        let settings = state.settings.lock().map_err(|_| "Settings lock".to_string())?;
        settings.quote_prefix.clone()
    };

    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    let mut taken: HashSet<String> = db
        .known_quote_nos()
        .map_err(|e| e.to_string())?
        .into_iter()
        .collect();
    if let Some(header) = db.get_quote_header().map_err(|e| e.to_string())? {
        if !header.quote_no.trim().is_empty() {
            taken.insert(header.quote_no);
        }
    }

    Ok(next_quote_no(&prefix, &taken))
}

fn next_quote_no(prefix: &str, taken: &HashSet<String>) -> String {
    let mut counter = taken.len() as u32 + 1;
    loop {
        let candidate = format!("{}-{:03}", prefix, counter);
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn mutate_header<F>(state: &AppState, mutate: F) -> Result<QuoteHeader, String>
where
    F: FnOnce(&mut QuoteHeader) -> Result<(), String>,
{
    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    let mut header = db
        .get_quote_header()
        .map_err(|e| e.to_string())?
        .unwrap_or_default();
    mutate(&mut header)?;
    db.save_quote_header(&header).map_err(|e| e.to_string())?;
    Ok(header)
}

fn line_at(header: &mut QuoteHeader, line_index: usize) -> Result<&mut QuoteLine, String> {
    header
        .lines
        .get_mut(line_index)
        .ok_or_else(|| "No such quote line".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggested_quote_no_skips_taken_numbers() {
        let mut taken = HashSet::new();
        assert_eq!(next_quote_no("QT", &taken), "QT-001");

        taken.insert("QT-001".to_string());
        taken.insert("QT-002".to_string());
        assert_eq!(next_quote_no("QT", &taken), "QT-003");

        // counter starts past the taken count but still probes for gaps
        taken.insert("QT-004".to_string());
        assert_eq!(next_quote_no("QT", &taken), "QT-005");
    }
}
