//! ワードローブの一括読み出し
//!
//! バックエンドの行はポーラーから見て読み取り専用。

mod http;

pub use http::HttpWardrobe;

use crate::error::Result;
use async_trait::async_trait;
use rate_my_fit_common::{ClothingItem, WardrobeItem};
use std::collections::HashMap;

/// ID → 現在の extracted_clothing_items
pub type ClothingItemsById = HashMap<String, Vec<ClothingItem>>;

#[async_trait]
pub trait WardrobeSource: Send + Sync {
    /// 指定IDの行だけを1回のクエリで取得する
    async fn fetch_clothing_items(&self, ids: &[String]) -> Result<ClothingItemsById>;
}

/// 取得結果を要求順の行に組み立てる。見つからなかったIDは2つ目で返す
pub fn rows_for_ids(
    ids: &[String],
    mut fetched: ClothingItemsById,
) -> (Vec<WardrobeItem>, Vec<String>) {
    let mut rows = Vec::with_capacity(ids.len());
    let mut missing = Vec::new();
    for id in ids {
        match fetched.remove(id) {
            Some(entries) => rows.push(WardrobeItem {
                id: id.clone(),
                extracted_clothing_items: entries,
            }),
            None => missing.push(id.clone()),
        }
    }
    (rows, missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_for_ids_reports_missing() {
        let ids: Vec<String> = vec!["a".into(), "gone".into(), "b".into()];
        let mut fetched = ClothingItemsById::new();
        fetched.insert("b".into(), vec![ClothingItem::new("belt")]);
        fetched.insert("a".into(), vec![ClothingItem::new("coat")]);

        let (rows, missing) = rows_for_ids(&ids, fetched);

        let row_ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(row_ids, vec!["a", "b"]);
        assert_eq!(rows[1].extracted_clothing_items[0].name, "belt");
        assert_eq!(missing, vec!["gone".to_string()]);
    }

    #[test]
    fn test_rows_for_ids_all_found() {
        let ids: Vec<String> = vec!["a".into()];
        let mut fetched = ClothingItemsById::new();
        fetched.insert("a".into(), Vec::new());

        let (rows, missing) = rows_for_ids(&ids, fetched);
        assert_eq!(rows.len(), 1);
        assert!(missing.is_empty());
    }
}
