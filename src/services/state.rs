use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};

use crate::db::Database;
use crate::models::Settings;

pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub settings: Arc<Mutex<Settings>>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        AppState {
            db: Arc::new(Mutex::new(db)),
            settings: Arc::new(Mutex::new(settings)),
        }
    }

    pub fn update_settings(&self, settings: Settings) -> Result<()> {
        let mut locked = self.settings.lock().map_err(|_| anyhow!("Settings lock"))?;
        *locked = settings;
        Ok(())
    }
}
