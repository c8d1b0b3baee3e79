use super::{AnalysisRequest, OutfitAnalyzer};
use crate::error::{RateMyFitError, Result};
use async_trait::async_trait;
use rate_my_fit_common::{parse_analysis_response, AnalysisResult};
use reqwest::Client;
use std::time::Duration;

const ANALYZE_FUNCTION_PATH: &str = "/functions/v1/analyze-outfit";

/// サーバーレス関数経由の解析クライアント
#[derive(Debug, Clone)]
pub struct HttpAnalyzer {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpAnalyzer {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), ANALYZE_FUNCTION_PATH),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OutfitAnalyzer for HttpAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        log::debug!(
            "POST {} ({} chars, gender={}, mode={})",
            self.endpoint,
            request.image_data.len(),
            request.gender,
            request.feedback_mode
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RateMyFitError::ApiCall(format!("status {}: {}", status, body)));
        }

        log::debug!("analysis response: {} chars", body.len());

        parse_analysis_response(&body).map_err(|e| RateMyFitError::ApiParse(e.to_string()))
    }
}
