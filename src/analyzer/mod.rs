//! 解析ファンクション連携
//!
//! リモートの解析処理は不透明なサービスとして扱い、
//! (画像, 性別, モード) を渡して AnalysisResult を受け取るだけ。

mod http;

pub use http::HttpAnalyzer;
pub use rate_my_fit_common::AnalysisResult;

use crate::error::Result;
use async_trait::async_trait;
use rate_my_fit_common::{FeedbackMode, Gender};
use serde::{Deserialize, Serialize};

/// 解析ファンクションへのリクエストボディ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub image_data: String,
    pub gender: Gender,
    pub feedback_mode: FeedbackMode,
}

#[async_trait]
pub trait OutfitAnalyzer: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult>;
}
