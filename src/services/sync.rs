//! Read-through / write-through glue between the local database and the
//! remote document store.
//!
//! Reads refresh the local cache from the remote and fall back to the cache
//! when the remote is unreachable. Writes land locally first (the local
//! record is authoritative), then mirror to the remote; a failed mirror is
//! surfaced to the caller, never retried automatically.

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use crate::models::{FinalizedQuote, Hospital, Instrument};
use crate::services::remote::{RemoteStore, HOSPITALS, INSTRUMENTS, QUOTE_HISTORY};
use crate::services::state::AppState;

fn remote_store(state: &AppState) -> Result<Option<RemoteStore>> {
    let settings = state
        .settings
        .lock()
        .map_err(|_| anyhow!("Settings lock poisoned"))?;
    Ok(RemoteStore::from_settings(&settings))
}

pub async fn refresh_hospitals(state: &AppState) -> Result<Vec<Hospital>> {
    if let Some(remote) = remote_store(state)? {
        match remote.list::<Hospital>(HOSPITALS).await {
            Ok(hospitals) => {
                let mut db = state.db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
                db.replace_hospitals(&hospitals)?;
                info!(count = hospitals.len(), "refreshed hospitals from remote");
            }
            Err(err) => {
                warn!(error = %err, "remote hospitals fetch failed, serving cached copy");
            }
        }
    }

    let db = state.db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
    Ok(db.list_hospitals()?)
}

pub async fn save_hospital(state: &AppState, hospital: &Hospital) -> Result<()> {
    {
        let db = state.db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
        db.upsert_hospital(hospital)?;
    }
    mirror_write(state, HOSPITALS, &hospital.id, hospital).await
}

pub async fn delete_hospital(state: &AppState, id: &str) -> Result<()> {
    {
        let db = state.db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
        db.delete_hospital(id)?;
    }
    mirror_delete(state, HOSPITALS, id).await
}

pub async fn refresh_instruments(state: &AppState) -> Result<Vec<Instrument>> {
    if let Some(remote) = remote_store(state)? {
        match remote.list::<Instrument>(INSTRUMENTS).await {
            Ok(instruments) => {
                let mut db = state.db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
                db.replace_instruments(&instruments)?;
                info!(count = instruments.len(), "refreshed instruments from remote");
            }
            Err(err) => {
                warn!(error = %err, "remote instruments fetch failed, serving cached copy");
            }
        }
    }

    let db = state.db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
    Ok(db.list_instruments()?)
}

pub async fn save_instrument(state: &AppState, instrument: &Instrument) -> Result<()> {
    {
        let db = state.db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
        db.upsert_instrument(instrument)?;
    }
    mirror_write(state, INSTRUMENTS, &instrument.id, instrument).await
}

pub async fn delete_instrument(state: &AppState, id: &str) -> Result<()> {
    {
        let db = state.db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
        db.delete_instrument(id)?;
    }
    mirror_delete(state, INSTRUMENTS, id).await
}

/// Best-effort mirror of a finalized quote into the remote history
/// collection. The local append has already happened and stands either
/// way; the return value only reports whether the mirror landed.
pub async fn mirror_finalized_quote(state: &AppState, quote: &FinalizedQuote) -> bool {
    let remote = match remote_store(state) {
        Ok(Some(remote)) => remote,
        Ok(None) => return false,
        Err(err) => {
            warn!(error = %err, "remote store unavailable for quote mirror");
            return false;
        }
    };

    match remote.put(QUOTE_HISTORY, &quote.id, quote).await {
        Ok(()) => true,
        Err(err) => {
            warn!(
                quote_no = %quote.header.quote_no,
                revision = quote.revision,
                error = %err,
                "finalized quote mirror failed, local record stands"
            );
            false
        }
    }
}

async fn mirror_write<T: serde::Serialize>(
    state: &AppState,
    collection: &str,
    id: &str,
    doc: &T,
) -> Result<()> {
    match remote_store(state)? {
        Some(remote) => remote
            .put(collection, id, doc)
            .await
            .map_err(|err| anyhow!("Saved locally; remote sync failed: {}", err)),
        None => Ok(()),
    }
}

async fn mirror_delete(state: &AppState, collection: &str, id: &str) -> Result<()> {
    match remote_store(state)? {
        Some(remote) => remote
            .delete(collection, id)
            .await
            .map_err(|err| anyhow!("Deleted locally; remote sync failed: {}", err)),
        None => Ok(()),
    }
}
