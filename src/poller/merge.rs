//! ポーリング対象の判定と差分マージ
//!
//! 同じ行の中では配列の位置がアイテムの同一性なので、比較は添字単位で行う。

use crate::wardrobe::ClothingItemsById;
use rate_my_fit_common::{ClothingItem, WardrobeItem};

/// サムネイル待ちのエントリを1つ以上持つ行のID
pub fn ids_needing_polling(items: &[WardrobeItem]) -> Vec<String> {
    items
        .iter()
        .filter(|item| item.needs_polling())
        .map(|item| item.id.clone())
        .collect()
}

/// サムネイル待ちのエントリ総数
pub fn pending_image_count(items: &[WardrobeItem]) -> usize {
    items.iter().map(WardrobeItem::pending_render_count).sum()
}

/// 前回になくて今回サムネイルURLを持つエントリ数
pub fn count_newly_completed(previous: &[ClothingItem], fetched: &[ClothingItem]) -> usize {
    fetched
        .iter()
        .enumerate()
        .filter(|(idx, item)| {
            item.has_render_image()
                && !previous.get(*idx).is_some_and(ClothingItem::has_render_image)
        })
        .count()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub items: Vec<WardrobeItem>,
    pub newly_completed: usize,
}

/// 取得結果をローカルの行にマージする
///
/// 新しく完成したエントリが1つもなければ `None`（呼び出し側は何も通知しない）。
pub fn merge_updates(items: &[WardrobeItem], fetched: &ClothingItemsById) -> Option<MergeOutcome> {
    let mut newly_completed = 0;
    let merged: Vec<WardrobeItem> = items
        .iter()
        .map(|item| match fetched.get(&item.id) {
            Some(latest) => {
                let gained = count_newly_completed(&item.extracted_clothing_items, latest);
                if gained == 0 {
                    return item.clone();
                }
                newly_completed += gained;
                WardrobeItem {
                    id: item.id.clone(),
                    extracted_clothing_items: latest.clone(),
                }
            }
            None => item.clone(),
        })
        .collect();

    (newly_completed > 0).then_some(MergeOutcome {
        items: merged,
        newly_completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(name: &str) -> ClothingItem {
        ClothingItem {
            render_image_url: Some(format!("https://cdn.example/{}.png", name)),
            ..ClothingItem::new(name)
        }
    }

    fn row(id: &str, entries: Vec<ClothingItem>) -> WardrobeItem {
        WardrobeItem {
            id: id.into(),
            extracted_clothing_items: entries,
        }
    }

    #[test]
    fn test_ids_needing_polling() {
        let items = vec![
            row("done", vec![rendered("coat")]),
            row("pending", vec![rendered("coat"), ClothingItem::new("scarf")]),
            row("empty", vec![]),
        ];
        assert_eq!(ids_needing_polling(&items), vec!["pending"]);
        assert_eq!(pending_image_count(&items), 1);
    }

    #[test]
    fn test_count_newly_completed_by_index() {
        let previous = vec![ClothingItem::new("coat"), rendered("boots"), ClothingItem::new("hat")];
        let fetched = vec![rendered("coat"), rendered("boots"), ClothingItem::new("hat")];
        assert_eq!(count_newly_completed(&previous, &fetched), 1);
        assert_eq!(count_newly_completed(&fetched, &fetched), 0);
    }

    #[test]
    fn test_merge_updates_replaces_changed_rows_only() {
        let items = vec![
            row("a", vec![ClothingItem::new("coat")]),
            row("b", vec![ClothingItem::new("jeans")]),
        ];
        let mut fetched = ClothingItemsById::new();
        fetched.insert("a".into(), vec![rendered("coat")]);
        fetched.insert("b".into(), vec![ClothingItem::new("jeans")]);

        let outcome = merge_updates(&items, &fetched).expect("変更があるはず");
        assert_eq!(outcome.newly_completed, 1);
        assert!(outcome.items[0].extracted_clothing_items[0].has_render_image());
        assert_eq!(outcome.items[1], items[1]);
    }

    #[test]
    fn test_merge_updates_identical_data() {
        let items = vec![row("a", vec![ClothingItem::new("coat"), rendered("boots")])];
        let mut fetched = ClothingItemsById::new();
        fetched.insert("a".into(), items[0].extracted_clothing_items.clone());

        assert_eq!(merge_updates(&items, &fetched), None);
        assert_eq!(merge_updates(&items, &ClothingItemsById::new()), None);
    }
}
