//! 起動時の環境準備
//!
//! ストレージバケットの用意は冪等だが、初回利用より前に1度だけ済ませておく必要がある。
//! モジュール読み込み時の副作用にはせず、起動シーケンスから明示的に await する。

use crate::error::{RateMyFitError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tokio::sync::OnceCell;

pub const OUTFIT_BUCKET: &str = "outfit-images";

#[async_trait]
pub trait BucketProvisioner: Send + Sync {
    /// 既に存在していれば何もしない
    async fn ensure_bucket(&self, name: &str) -> Result<()>;
}

/// 1度だけ成功させる初期化
#[derive(Debug, Default)]
pub struct StorageBootstrap {
    ready: OnceCell<()>,
}

impl StorageBootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 失敗した場合は次の呼び出しで再試行される
    pub async fn ensure_initialized<P>(&self, provisioner: &P) -> Result<()>
    where
        P: BucketProvisioner + ?Sized,
    {
        self.ready
            .get_or_try_init(|| async {
                provisioner.ensure_bucket(OUTFIT_BUCKET).await?;
                log::info!("storage bucket ready: {}", OUTFIT_BUCKET);
                Ok::<(), RateMyFitError>(())
            })
            .await?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.ready.initialized()
    }
}

/// ストレージAPI経由のバケット作成
#[derive(Debug, Clone)]
pub struct HttpStorage {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpStorage {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl BucketProvisioner for HttpStorage {
    async fn ensure_bucket(&self, name: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/storage/v1/bucket", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&json!({ "id": name, "name": name, "public": true }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::CONFLICT {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        // 既存バケットは 400 + "already exists" で返ることもある
        if body.contains("already exists") {
            return Ok(());
        }
        Err(RateMyFitError::ApiCall(format!(
            "bucket {} (status {}): {}",
            name, status, body
        )))
    }
}
