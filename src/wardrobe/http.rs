use super::{ClothingItemsById, WardrobeSource};
use crate::error::{RateMyFitError, Result};
use async_trait::async_trait;
use rate_my_fit_common::WardrobeItem;
use reqwest::Client;
use std::time::Duration;

const WARDROBE_TABLE_PATH: &str = "/rest/v1/wardrobe_items";

/// REST テーブル経由のワードローブ読み出し
#[derive(Debug, Clone)]
pub struct HttpWardrobe {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpWardrobe {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), WARDROBE_TABLE_PATH),
            api_key,
        })
    }
}

/// `id=in.("a","b")` 形式のフィルタ
pub(crate) fn id_filter(ids: &[String]) -> String {
    let quoted = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('"', "")))
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", quoted)
}

#[async_trait]
impl WardrobeSource for HttpWardrobe {
    async fn fetch_clothing_items(&self, ids: &[String]) -> Result<ClothingItemsById> {
        if ids.is_empty() {
            return Ok(ClothingItemsById::new());
        }

        let response = self
            .client
            .get(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[
                ("id", id_filter(ids)),
                ("select", "id,extracted_clothing_items".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RateMyFitError::ApiCall(format!("status {}: {}", status, body)));
        }

        let rows: Vec<WardrobeItem> = response
            .json()
            .await
            .map_err(|e| RateMyFitError::ApiParse(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.id, row.extracted_clothing_items))
            .collect())
    }
}
