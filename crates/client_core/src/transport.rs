//! HTTP access to the wine-list REST API.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{NewWine, Wine, WineListId, WinePatch, WineServerId},
    protocol::{paths, WineListResponse},
};
use tracing::debug;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

#[async_trait]
pub trait WineApi: Send + Sync {
    async fn list_wines(&self, list_id: WineListId) -> Result<Vec<Wine>>;
    async fn create_wine(&self, list_id: WineListId, wine: &NewWine) -> Result<Wine>;
    async fn update_wines(&self, patches: &[WinePatch]) -> Result<serde_json::Value>;
    async fn delete_wine(&self, wine_id: WineServerId) -> Result<serde_json::Value>;
}

pub struct MissingWineApi;

#[async_trait]
impl WineApi for MissingWineApi {
    async fn list_wines(&self, list_id: WineListId) -> Result<Vec<Wine>> {
        Err(anyhow!("wine api unavailable for list {}", list_id.0))
    }

    async fn create_wine(&self, list_id: WineListId, _wine: &NewWine) -> Result<Wine> {
        Err(anyhow!("wine api unavailable for list {}", list_id.0))
    }

    async fn update_wines(&self, _patches: &[WinePatch]) -> Result<serde_json::Value> {
        Err(anyhow!("wine api unavailable"))
    }

    async fn delete_wine(&self, wine_id: WineServerId) -> Result<serde_json::Value> {
        Err(anyhow!("wine api unavailable for wine {}", wine_id.0))
    }
}

pub struct HttpWineApi {
    http: Client,
    base_url: String,
}

impl HttpWineApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Default for HttpWineApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

#[async_trait]
impl WineApi for HttpWineApi {
    async fn list_wines(&self, list_id: WineListId) -> Result<Vec<Wine>> {
        let body: WineListResponse = self
            .http
            .get(self.url(&paths::wine_list(list_id)))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(list_id = list_id.0, rows = body.wines.len(), "wines: list response");
        Ok(body.wines)
    }

    async fn create_wine(&self, list_id: WineListId, wine: &NewWine) -> Result<Wine> {
        let created: Wine = self
            .http
            .post(self.url(&paths::create_wine(list_id)))
            .json(wine)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(created)
    }

    async fn update_wines(&self, patches: &[WinePatch]) -> Result<serde_json::Value> {
        let body = self
            .http
            .patch(self.url(paths::UPDATE_WINES))
            .json(patches)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body)
    }

    async fn delete_wine(&self, wine_id: WineServerId) -> Result<serde_json::Value> {
        let body = self
            .http
            .delete(self.url(&paths::delete_wine(wine_id)))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
