//! APIレスポンスパーサー
//!
//! 解析ファンクションのレスポンスからJSONオブジェクトを抽出し、
//! AnalysisResult にパースする

use crate::error::{Error, Result};
use crate::types::AnalysisResult;

/// スコアの上限
pub const MAX_SCORE: f32 = 10.0;

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 最初の `{` から最後の `}` まで
/// 3. エラー
///
/// # Examples
/// ```
/// use rate_my_fit_common::extract_json_object;
///
/// let response = "Sure! {\"score\": 8} Hope that helps.";
/// assert_eq!(extract_json_object(response).unwrap(), "{\"score\": 8}");
/// ```
pub fn extract_json_object(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSON object not found".into()))
}

/// 解析レスポンスをパース
///
/// スコアは 0〜10 に丸める。NaN は 0 として扱う。
pub fn parse_analysis_response(response: &str) -> Result<AnalysisResult> {
    let json_str = extract_json_object(response)?;
    let mut result: AnalysisResult = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("analysis JSON: {}", e)))?;

    result.score = if result.score.is_nan() {
        0.0
    } else {
        result.score.clamp(0.0, MAX_SCORE)
    };
    result.suggestions.retain(|s| !s.trim().is_empty());

    Ok(result)
}
