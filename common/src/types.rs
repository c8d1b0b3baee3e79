//! 共有型定義
//!
//! - Gender / FeedbackMode: 解析リクエストのタグ
//! - AnalysisResult: リモート解析の出力
//! - WardrobeItem / ClothingItem: 保存済みコーデと抽出されたアイテム

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 評価対象の性別タグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    #[default]
    Male,
    Female,
    NonBinary,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non-binary",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "non-binary" | "nonbinary" | "nb" => Ok(Gender::NonBinary),
            _ => Err(format!("Unknown gender: {}. Use male, female, or non-binary", s)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// フィードバックのトーン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackMode {
    /// 通常の講評
    #[default]
    Normal,
    /// 辛口（ロースト）
    Roast,
}

impl FeedbackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackMode::Normal => "normal",
            FeedbackMode::Roast => "roast",
        }
    }
}

impl FromStr for FeedbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" | "n" => Ok(FeedbackMode::Normal),
            "roast" | "r" => Ok(FeedbackMode::Roast),
            _ => Err(format!("Unknown feedback mode: {}. Use normal or roast", s)),
        }
    }
}

impl fmt::Display for FeedbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AI解析結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// スコア（0〜10）
    pub score: f32,

    #[serde(default)]
    pub feedback: String,

    #[serde(default)]
    pub suggestions: Vec<String>,

    /// スタイル分析（形式はAI側に依存するため不透明値で保持）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_analysis: Option<serde_json::Value>,
}

/// コーデから抽出された服アイテム
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClothingItem {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// サーバー側で非同期生成されるサムネイル
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_image_url: Option<String>,
}

impl ClothingItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// サムネイルURLを持っているか（空文字は未生成扱い）
    pub fn has_render_image(&self) -> bool {
        self.render_image_url
            .as_deref()
            .is_some_and(|url| !url.is_empty())
    }

    /// 名前があり、サムネイルがまだ無い
    pub fn needs_render(&self) -> bool {
        !self.name.trim().is_empty() && !self.has_render_image()
    }
}

/// ワードローブの1行（バックエンド所有、ポーラーからは読み取り専用）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub id: String,

    #[serde(default)]
    pub extracted_clothing_items: Vec<ClothingItem>,
}

impl WardrobeItem {
    /// サムネイル待ちのアイテム数
    pub fn pending_render_count(&self) -> usize {
        self.extracted_clothing_items
            .iter()
            .filter(|c| c.needs_render())
            .count()
    }

    pub fn needs_polling(&self) -> bool {
        self.extracted_clothing_items.iter().any(ClothingItem::needs_render)
    }
}
