//! Remote backend: a single REST table keyed by `id` (PostgREST-style
//! endpoints), fetched in full and re-fetched after every successful write
//! so the cached list always matches the authoritative order.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use volt_core::BillRecord;

use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Service root, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    pub api_key: String,
    /// Table name under `/rest/v1/`
    pub table: String,
}

pub struct RemoteStore {
    cfg: RemoteConfig,
    client: reqwest::Client,
    records: Vec<BillRecord>,
}

impl RemoteStore {
    /// Connect and perform the initial full fetch.
    pub async fn connect(cfg: RemoteConfig) -> Result<Self, StoreError> {
        let mut store = Self {
            cfg,
            client: reqwest::Client::new(),
            records: Vec::new(),
        };
        store.records = store.fetch_all().await?;
        Ok(store)
    }

    /// Records as of the last successful fetch, newest insert date first.
    pub fn list(&self) -> &[BillRecord] {
        &self.records
    }

    /// Upsert by id, then refresh from the table.
    pub async fn save(&mut self, record: BillRecord) -> Result<(), StoreError> {
        let resp = self
            .client
            .post(self.table_url())
            .headers(self.headers()?)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[record])
            .send()
            .await?;
        Self::check_status(resp).await?;
        self.records = self.fetch_all().await?;
        Ok(())
    }

    /// Delete by id, then refresh. Deleting an absent id succeeds with
    /// zero rows affected, which matches the no-op contract.
    pub async fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let url = format!("{}?id=eq.{}", self.table_url(), id);
        let resp = self
            .client
            .delete(&url)
            .headers(self.headers()?)
            .send()
            .await?;
        Self::check_status(resp).await?;
        self.records = self.fetch_all().await?;
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<BillRecord>, StoreError> {
        let url = format!("{}?select=*&order=dateInserted.desc", self.table_url());
        let resp = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let records: Vec<BillRecord> = resp.json().await?;
        log::debug!("fetched {} records from {}", records.len(), self.cfg.table);
        Ok(records)
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.table
        )
    }

    fn headers(&self) -> Result<HeaderMap, StoreError> {
        let key = HeaderValue::from_str(&self.cfg.api_key)
            .map_err(|_| StoreError::Config("api key is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.cfg.api_key))
            .map_err(|_| StoreError::Config("api key is not a valid header value".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }
}
