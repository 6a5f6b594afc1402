//! HTTP client for the remote document store.
//!
//! Collections are plain JSON documents addressed as
//! `{base_url}/{collection}/{id}`; a GET on the collection returns the full
//! document list. The store is a mirror: the local database stays
//! authoritative when any call here fails.

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::Settings;

pub const HOSPITALS: &str = "hospitals";
pub const INSTRUMENTS: &str = "instruments";
pub const QUOTE_HISTORY: &str = "quoteHistory";

pub struct RemoteStore {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl RemoteStore {
    /// Returns `None` when no remote endpoint is configured (offline mode).
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let base_url = settings.remote_base_url.as_ref()?.trim().to_string();
        if base_url.is_empty() {
            return None;
        }
        Some(RemoteStore {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: settings.remote_api_key.clone(),
            client: reqwest::Client::new(),
        })
    }

    pub async fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.base_url, collection);
        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Remote list {} failed {}: {}", collection, status, body));
        }

        Ok(response.json().await?)
    }

    pub async fn put<T: Serialize>(&self, collection: &str, id: &str, doc: &T) -> Result<()> {
        let url = format!("{}/{}/{}", self.base_url, collection, id);
        let mut request = self.client.put(&url).json(doc);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Remote write {}/{} failed {}: {}", collection, id, status, body));
        }
        Ok(())
    }

    pub async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let url = format!("{}/{}/{}", self.base_url, collection, id);
        let mut request = self.client.delete(&url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Remote delete {}/{} failed {}: {}", collection, id, status, body));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(url: Option<&str>) -> Settings {
        Settings {
            remote_base_url: url.map(str::to_string),
            remote_api_key: None,
            quote_prefix: "QT".to_string(),
        }
    }

    #[test]
    fn store_is_offline_without_base_url() {
        assert!(RemoteStore::from_settings(&settings(None)).is_none());
        assert!(RemoteStore::from_settings(&settings(Some("  "))).is_none());
    }

    #[test]
    fn base_url_is_normalized() {
        let store = RemoteStore::from_settings(&settings(Some("https://db.example.com/api/"))).unwrap();
        assert_eq!(store.base_url, "https://db.example.com/api");
    }
}
