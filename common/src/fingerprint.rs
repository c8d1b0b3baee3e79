//! リクエスト指紋
//!
//! (画像, 性別, フィードバックモード) から重複判定用のキーを作る。
//! 画像ダイジェストは先頭 [`DIGEST_PREFIX_LEN`] バイトの簡易ハッシュと全体長の組み合わせで、
//! 暗号学的な一意性はなく、別画像の衝突は許容する。

use crate::types::{FeedbackMode, Gender};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ダイジェスト計算に使う先頭バイト数
pub const DIGEST_PREFIX_LEN: usize = 1000;

/// 論理的に同じ解析リクエストを識別するキー
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFingerprint {
    pub gender: Gender,
    pub feedback_mode: FeedbackMode,
    pub image_digest: String,
}

impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.gender, self.feedback_mode, self.image_digest)
    }
}

/// 指紋を計算（純関数）
pub fn compute_fingerprint(
    image_data: &[u8],
    gender: Gender,
    feedback_mode: FeedbackMode,
) -> RequestFingerprint {
    RequestFingerprint {
        gender,
        feedback_mode,
        image_digest: image_digest(image_data),
    }
}

/// 簡易ダイジェスト: 全体長 + 先頭バイトの31倍ハッシュ
fn image_digest(image_data: &[u8]) -> String {
    let prefix_hash = image_data
        .iter()
        .take(DIGEST_PREFIX_LEN)
        .fold(0u32, |hash, &b| hash.wrapping_mul(31).wrapping_add(b as u32));

    format!("{:x}{:08x}", image_data.len(), prefix_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let image = b"data:image/jpeg;base64,/9j/4AAQSkZJRgABAQ";
        let a = compute_fingerprint(image, Gender::Female, FeedbackMode::Roast);
        let b = compute_fingerprint(image, Gender::Female, FeedbackMode::Roast);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_fingerprint_distinguishes_tags() {
        let image = b"same image bytes";
        let normal = compute_fingerprint(image, Gender::Male, FeedbackMode::Normal);
        let roast = compute_fingerprint(image, Gender::Male, FeedbackMode::Roast);
        let female = compute_fingerprint(image, Gender::Female, FeedbackMode::Normal);

        assert_ne!(normal, roast);
        assert_ne!(normal, female);
        assert_eq!(normal.image_digest, roast.image_digest);
    }

    #[test]
    fn test_fingerprint_distinguishes_images() {
        let a = compute_fingerprint(b"outfit one", Gender::Male, FeedbackMode::Normal);
        let b = compute_fingerprint(b"outfit two", Gender::Male, FeedbackMode::Normal);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_length_beyond_prefix() {
        // 先頭が同じでも長さが違えば別扱い
        let short = vec![7u8; DIGEST_PREFIX_LEN + 10];
        let long = vec![7u8; DIGEST_PREFIX_LEN + 20];
        let a = compute_fingerprint(&short, Gender::Male, FeedbackMode::Normal);
        let b = compute_fingerprint(&long, Gender::Male, FeedbackMode::Normal);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_display() {
        let fp = compute_fingerprint(b"", Gender::NonBinary, FeedbackMode::Roast);
        assert_eq!(fp.to_string(), "non-binary-roast-000000000");
    }
}
