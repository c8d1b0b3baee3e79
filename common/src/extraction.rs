//! フィードバック文からの服アイテム抽出
//!
//! キーワード照合による簡易ヒューリスティック。
//! 「色 + アイテム名」の並びを拾い、アイテム名ごとに最初の出現だけを残す。

use crate::types::ClothingItem;
use regex::Regex;
use std::collections::HashSet;

/// (キーワード, カテゴリ)
const GARMENTS: &[(&str, &str)] = &[
    ("t-shirt", "top"),
    ("shirt", "top"),
    ("blouse", "top"),
    ("sweater", "top"),
    ("hoodie", "top"),
    ("cardigan", "top"),
    ("tank top", "top"),
    ("polo", "top"),
    ("turtleneck", "top"),
    ("trench coat", "outerwear"),
    ("jacket", "outerwear"),
    ("coat", "outerwear"),
    ("blazer", "outerwear"),
    ("parka", "outerwear"),
    ("jeans", "bottom"),
    ("trousers", "bottom"),
    ("pants", "bottom"),
    ("chinos", "bottom"),
    ("shorts", "bottom"),
    ("skirt", "bottom"),
    ("leggings", "bottom"),
    ("dress", "dress"),
    ("jumpsuit", "dress"),
    ("sneakers", "footwear"),
    ("boots", "footwear"),
    ("loafers", "footwear"),
    ("heels", "footwear"),
    ("sandals", "footwear"),
    ("shoes", "footwear"),
    ("belt", "accessory"),
    ("hat", "accessory"),
    ("cap", "accessory"),
    ("scarf", "accessory"),
    ("bag", "accessory"),
    ("watch", "accessory"),
    ("sunglasses", "accessory"),
];

const COLORS: &[&str] = &[
    "black", "white", "grey", "gray", "navy", "blue", "red", "green", "olive", "beige",
    "tan", "brown", "camel", "cream", "pink", "purple", "yellow", "orange", "burgundy",
    "khaki",
];

/// 長いキーワードを先に並べた正規表現の選択肢
fn alternation<'a>(words: impl Iterator<Item = &'a str>) -> String {
    let mut words: Vec<&str> = words.collect();
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

fn category_of(garment: &str) -> Option<&'static str> {
    GARMENTS
        .iter()
        .find(|(name, _)| *name == garment)
        .map(|(_, category)| *category)
}

/// テキスト中の服アイテムを出現順に抽出
pub fn extract_clothing_items(text: &str) -> Vec<ClothingItem> {
    lazy_static::lazy_static! {
        static ref ITEM_RE: Regex = Regex::new(&format!(
            r"\b(?:({})\s+)?({})\b",
            alternation(COLORS.iter().copied()),
            alternation(GARMENTS.iter().map(|(name, _)| *name)),
        ))
        .unwrap();
    }

    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for cap in ITEM_RE.captures_iter(&lowered) {
        let garment = &cap[2];
        if !seen.insert(garment.to_string()) {
            continue;
        }

        let color = cap.get(1).map(|m| m.as_str().to_string());
        let name = match &color {
            Some(c) => format!("{} {}", c, garment),
            None => garment.to_string(),
        };

        items.push(ClothingItem {
            name,
            color,
            category: category_of(garment).map(str::to_string),
            render_image_url: None,
        });
    }

    items
}

/// テキスト中の色を出現順・重複なしで抽出
pub fn extract_colors(text: &str) -> Vec<String> {
    lazy_static::lazy_static! {
        static ref COLOR_RE: Regex =
            Regex::new(&format!(r"\b({})\b", alternation(COLORS.iter().copied()))).unwrap();
    }

    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    COLOR_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
