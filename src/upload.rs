//! アップロード〜解析の流れ
//!
//! 1. 画像を同期的に検証（ネットワーク前に弾く）
//! 2. 重複・同時実行数をチェック
//! 3. Pending 登録とセッション更新（1〜3 の間に await を挟まない）
//! 4. 解析を待ち、結果をセッションへ。失敗は Failed にして即再試行可能にする

use crate::analyzer::{AnalysisRequest, OutfitAnalyzer};
use crate::dedup::{DedupConfig, Deduplicator};
use crate::error::{RateMyFitError, Result};
use crate::notify::Notifier;
use crate::session::{CurrentUpload, UploadSession};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use rate_my_fit_common::{AnalysisResult, FeedbackMode, Gender, RequestFingerprint};
use std::path::Path;
use std::sync::Arc;

const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// 画像バイト列を検証し、MIMEタイプを返す
pub fn validate_image(bytes: &[u8], max_bytes: usize) -> Result<&'static str> {
    if bytes.is_empty() {
        return Err(RateMyFitError::EmptyImage);
    }
    if bytes.len() > max_bytes {
        return Err(RateMyFitError::ImageTooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    let format = image::guess_format(bytes)
        .map_err(|_| RateMyFitError::UnsupportedImage("unknown".into()))?;
    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(RateMyFitError::UnsupportedImage(format!("{:?}", format)));
    }

    Ok(format.to_mime_type())
}

/// 画像ファイルを読み込んで検証する
pub fn read_image_file(path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(RateMyFitError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    validate_image(&bytes, max_bytes)?;
    Ok(bytes)
}

/// "data:<mime>;base64,<payload>" 形式に変換
pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Data URL を (MIMEタイプ, Base64部分) に分解
pub fn split_data_url(data_url: &str) -> Option<(&str, &str)> {
    let rest = data_url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    Some((mime, payload))
}

/// Data URL をデコード
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let (_, payload) = split_data_url(data_url)
        .ok_or_else(|| RateMyFitError::UnsupportedImage("not a base64 data URL".into()))?;
    STANDARD
        .decode(payload)
        .map_err(|e| RateMyFitError::UnsupportedImage(format!("invalid base64: {}", e)))
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Completed(AnalysisResult),
    /// 同じリクエストが期間内に処理中/完了済み
    Duplicate,
    /// 同時実行数の上限
    AtCapacity,
}

/// 受理済みで結果待ちのリクエスト
#[derive(Debug, Clone)]
pub struct PendingAnalysis {
    pub fingerprint: RequestFingerprint,
    pub request: AnalysisRequest,
}

pub enum Admission {
    Accepted(PendingAnalysis),
    Duplicate,
    AtCapacity,
}

pub struct AnalysisFlow<A> {
    analyzer: A,
    notifier: Arc<dyn Notifier>,
    dedup: Deduplicator,
    session: UploadSession,
    max_image_bytes: usize,
}

impl<A: OutfitAnalyzer> AnalysisFlow<A> {
    pub fn new(
        analyzer: A,
        notifier: Arc<dyn Notifier>,
        dedup_config: DedupConfig,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            analyzer,
            notifier,
            dedup: Deduplicator::new(dedup_config),
            session: UploadSession::new(),
            max_image_bytes,
        }
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut UploadSession {
        &mut self.session
    }

    pub fn deduplicator(&self) -> &Deduplicator {
        &self.dedup
    }

    /// 検証・重複チェック・登録までを同期的に行う
    pub fn begin(
        &mut self,
        image: &[u8],
        gender: Gender,
        feedback_mode: FeedbackMode,
    ) -> Result<Admission> {
        let mime = match validate_image(image, self.max_image_bytes) {
            Ok(mime) => mime,
            Err(e) => {
                self.notifier.error(&e.to_string());
                return Err(e);
            }
        };
        let image_data = encode_data_url(image, mime);

        if self.dedup.is_duplicate(image_data.as_bytes(), gender, feedback_mode) {
            log::info!("same outfit already analyzed recently, skipping");
            return Ok(Admission::Duplicate);
        }
        if !self.dedup.can_make_request() {
            log::info!(
                "analysis in progress ({} pending), skipping",
                self.dedup.pending_count()
            );
            return Ok(Admission::AtCapacity);
        }

        let fingerprint = self
            .dedup
            .start_request(image_data.as_bytes(), gender, feedback_mode);
        self.session.set_current_upload(Some(CurrentUpload::new(
            image_data.clone(),
            gender,
            feedback_mode,
        )));
        self.session.set_analysis_result(None);

        Ok(Admission::Accepted(PendingAnalysis {
            fingerprint,
            request: AnalysisRequest {
                image_data,
                gender,
                feedback_mode,
            },
        }))
    }

    /// 解析結果を反映し、重複抑止の枠を解放する
    pub fn finish(
        &mut self,
        pending: &PendingAnalysis,
        result: Result<AnalysisResult>,
    ) -> Result<AnalysisResult> {
        match result {
            Ok(result) => {
                self.dedup.complete_request(&pending.fingerprint);
                self.session.set_analysis_result(Some(result.clone()));
                self.notifier
                    .success(&format!("解析完了: {:.1} / 10", result.score));
                Ok(result)
            }
            Err(e) => {
                self.dedup.fail_request(&pending.fingerprint);
                log::warn!("analysis failed for {}: {}", pending.fingerprint, e);
                self.notifier.error(&format!("解析に失敗しました: {}", e));
                Err(e)
            }
        }
    }

    pub async fn submit(
        &mut self,
        image: &[u8],
        gender: Gender,
        feedback_mode: FeedbackMode,
    ) -> Result<AnalysisOutcome> {
        let pending = match self.begin(image, gender, feedback_mode)? {
            Admission::Accepted(pending) => pending,
            Admission::Duplicate => return Ok(AnalysisOutcome::Duplicate),
            Admission::AtCapacity => return Ok(AnalysisOutcome::AtCapacity),
        };

        let result = self.analyzer.analyze(&pending.request).await;
        self.finish(&pending, result).map(AnalysisOutcome::Completed)
    }

    /// 画面を離れるときなど
    pub fn reset(&mut self) {
        self.session.clear();
    }
}
