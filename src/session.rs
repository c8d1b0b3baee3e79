//! アップロード/解析セッションの状態
//!
//! 「何を送ったか」と「何が返ってきたか」を保持するだけで、検証はしない。
//! 書き込みはセッション所有者の単一スレッドからのみ行う前提。

use chrono::{DateTime, Utc};
use rate_my_fit_common::{AnalysisResult, FeedbackMode, Gender};
use serde::{Deserialize, Serialize};

/// 送信待ち/送信中のアップロード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUpload {
    /// Data URL 形式の画像
    pub image_data: String,
    pub gender: Gender,
    pub feedback_mode: FeedbackMode,
    pub timestamp: DateTime<Utc>,
}

impl CurrentUpload {
    pub fn new(image_data: String, gender: Gender, feedback_mode: FeedbackMode) -> Self {
        Self {
            image_data,
            gender,
            feedback_mode,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UploadSession {
    current_upload: Option<CurrentUpload>,
    analysis_result: Option<AnalysisResult>,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_upload(&self) -> Option<&CurrentUpload> {
        self.current_upload.as_ref()
    }

    pub fn set_current_upload(&mut self, upload: Option<CurrentUpload>) {
        self.current_upload = upload;
    }

    pub fn analysis_result(&self) -> Option<&AnalysisResult> {
        self.analysis_result.as_ref()
    }

    pub fn set_analysis_result(&mut self, result: Option<AnalysisResult>) {
        self.analysis_result = result;
    }

    pub fn take_analysis_result(&mut self) -> Option<AnalysisResult> {
        self.analysis_result.take()
    }

    pub fn has_session_data(&self) -> bool {
        self.current_upload.is_some() || self.analysis_result.is_some()
    }

    pub fn clear(&mut self) {
        self.current_upload = None;
        self.analysis_result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> CurrentUpload {
        CurrentUpload::new(
            "data:image/png;base64,iVBORw0KGgo=".into(),
            Gender::Female,
            FeedbackMode::Normal,
        )
    }

    fn result() -> AnalysisResult {
        AnalysisResult {
            score: 7.0,
            feedback: "Solid layering.".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_session() {
        let session = UploadSession::new();
        assert!(!session.has_session_data());
        assert!(session.current_upload().is_none());
        assert!(session.analysis_result().is_none());
    }

    #[test]
    fn test_fields_are_independent() {
        let mut session = UploadSession::new();
        let up = upload();
        session.set_current_upload(Some(up.clone()));
        assert!(session.has_session_data());

        session.set_analysis_result(Some(result()));
        assert_eq!(session.current_upload(), Some(&up));

        session.set_current_upload(None);
        assert_eq!(session.analysis_result(), Some(&result()));
        assert!(session.has_session_data());
    }

    #[test]
    fn test_clear_resets_both() {
        let mut session = UploadSession::new();
        session.set_current_upload(Some(upload()));
        session.set_analysis_result(Some(result()));

        session.clear();
        assert!(session.current_upload().is_none());
        assert!(session.analysis_result().is_none());
        assert!(!session.has_session_data());
    }

    #[test]
    fn test_take_analysis_result() {
        let mut session = UploadSession::new();
        session.set_analysis_result(Some(result()));

        assert_eq!(session.take_analysis_result(), Some(result()));
        assert!(!session.has_session_data());
    }
}
