#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod commands;
mod db;
mod models;
mod services;
mod utils;

use anyhow::anyhow;
use tauri::Manager;

use crate::models::Settings;
use crate::services::state::AppState;

fn main() {
    tracing_subscriber::fmt::init();

    tauri::Builder::default()
        .setup(|app| {
            let app_data_dir = app
                .path()
                .app_data_dir()
                .map_err(|e| anyhow!("App data dir: {}", e))?;
            std::fs::create_dir_all(&app_data_dir)?;

            let db_path = app_data_dir.join("mediquote.sqlite");
            let db = db::Database::new(db_path)?;
            let settings = load_settings(&db);

            app.manage(AppState::new(db, settings));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::settings::get_settings,
            commands::settings::save_settings,
            commands::dashboard::get_dashboard_stats,
            commands::hospitals::get_hospitals,
            commands::hospitals::save_hospital,
            commands::hospitals::delete_hospital,
            commands::instruments::get_instruments,
            commands::instruments::save_instrument,
            commands::instruments::delete_instrument,
            commands::quotes::get_quote_header,
            commands::quotes::save_quote_header,
            commands::quotes::add_quote_line,
            commands::quotes::update_line_quantity,
            commands::quotes::remove_quote_line,
            commands::quotes::add_config_item,
            commands::quotes::remove_config_item,
            commands::quotes::add_additional_item,
            commands::quotes::remove_additional_item,
            commands::quotes::finalize_quote,
            commands::quotes::get_quote_history,
            commands::quotes::get_quote_detail,
            commands::quotes::suggest_quote_no,
            commands::followups::add_follow_up,
            commands::followups::get_follow_ups,
            commands::users::resolve_landing_page,
            commands::users::list_users,
            commands::users::save_user,
            commands::users::delete_user,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

fn load_settings(db: &db::Database) -> Settings {
    let remote_base_url = db.get_setting("remote_base_url").ok().flatten();
    let remote_api_key = db.get_setting("remote_api_key").ok().flatten();
    let quote_prefix = db
        .get_setting("quote_prefix")
        .ok()
        .flatten()
        .unwrap_or_else(|| "QT".to_string());
    Settings {
        remote_base_url,
        remote_api_key,
        quote_prefix,
    }
}
