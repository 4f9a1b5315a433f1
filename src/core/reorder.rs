use crate::domain::model::{CollectionId, RankableItem, RankingEntry, RankingSubmission};
use crate::utils::error::{ClientError, Result};
use std::collections::HashSet;

/// Ordered items, index 0 being the favourite. Items are only ever moved;
/// the length and the set of ids are fixed once the list is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedList {
    items: Vec<RankableItem>,
}

impl RankedList {
    pub fn new(items: Vec<RankableItem>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(ClientError::InvalidRanking {
                    reason: format!("duplicate item id {}", item.id),
                });
            }
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[RankableItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&RankableItem> {
        self.items.get(index)
    }

    pub fn ids(&self) -> Vec<i64> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn sort_by_ordinal(&mut self) {
        // stable, so equal ordinals keep server order
        self.items.sort_by_key(|item| item.ordinal);
    }

    /// Removes the item at `from` and reinserts it at `to`. Returns false and
    /// leaves the list untouched when either index is out of bounds or they
    /// are equal.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.items.len() || to >= self.items.len() {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    /// Re-expresses the current order as item ids with 1-based positions.
    pub fn to_submission(&self, collection_id: CollectionId) -> RankingSubmission {
        RankingSubmission {
            collection_id,
            rankings: self
                .items
                .iter()
                .enumerate()
                .map(|(index, item)| RankingEntry {
                    item_id: item.id,
                    position: index as u32 + 1,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

/// Indices of one pointer gesture. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    source: Option<usize>,
    target: Option<usize>,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        self.source.is_some()
    }

    pub fn source(&self) -> Option<usize> {
        self.source
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    pub fn begin(&mut self, index: usize, len: usize) {
        if index >= len {
            return;
        }
        self.source = Some(index);
        self.target = None;
    }

    pub fn hover(&mut self, index: usize, len: usize) {
        if self.source.is_none() || index >= len {
            return;
        }
        self.target = Some(index);
    }

    /// Where a drop marker should be drawn, if anywhere.
    pub fn indicator(&self) -> Option<usize> {
        match (self.source, self.target) {
            (Some(source), Some(target)) if source != target => Some(target),
            _ => None,
        }
    }

    /// Applies the gesture to `list` and returns to idle. Calling it again
    /// without a new `begin` does nothing.
    pub fn commit(&mut self, list: &mut RankedList) -> Option<Move> {
        let gesture = std::mem::take(self);
        match (gesture.source, gesture.target) {
            (Some(from), Some(to)) if list.move_item(from, to) => Some(Move { from, to }),
            _ => None,
        }
    }

    pub fn abort(&mut self) {
        *self = DragState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abcd() -> RankedList {
        RankedList::new(vec![
            RankableItem::new(1, "A", 1),
            RankableItem::new(2, "B", 2),
            RankableItem::new(3, "C", 3),
            RankableItem::new(4, "D", 4),
        ])
        .unwrap()
    }

    fn titles(list: &RankedList) -> Vec<&str> {
        list.items().iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = RankedList::new(vec![RankableItem::new(1, "A", 1), RankableItem::new(1, "B", 2)]);
        assert!(matches!(result, Err(ClientError::InvalidRanking { .. })));
    }

    #[test]
    fn test_move_forward_is_a_move_not_a_swap() {
        let mut list = abcd();
        let mut drag = DragState::default();
        drag.begin(0, list.len());
        drag.hover(2, list.len());
        assert_eq!(drag.commit(&mut list), Some(Move { from: 0, to: 2 }));
        assert_eq!(titles(&list), vec!["B", "C", "A", "D"]);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_move_backward() {
        let mut list = abcd();
        assert!(list.move_item(3, 1));
        assert_eq!(titles(&list), vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn test_same_source_and_target_is_noop() {
        let mut list = abcd();
        let before = list.clone();
        let mut drag = DragState::default();
        drag.begin(1, list.len());
        drag.hover(1, list.len());
        assert_eq!(drag.indicator(), None);
        assert_eq!(drag.commit(&mut list), None);
        assert_eq!(list, before);
        assert_eq!(drag, DragState::default());
    }

    #[test]
    fn test_commit_without_target_clears_state() {
        let mut list = abcd();
        let mut drag = DragState::default();
        drag.begin(2, list.len());
        assert_eq!(drag.commit(&mut list), None);
        assert!(!drag.is_dragging());
        assert_eq!(titles(&list), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_commit_is_idempotent() {
        let mut once = abcd();
        let mut twice = abcd();
        let mut drag_once = DragState::default();
        let mut drag_twice = DragState::default();

        drag_once.begin(3, 4);
        drag_once.hover(0, 4);
        drag_once.commit(&mut once);

        drag_twice.begin(3, 4);
        drag_twice.hover(0, 4);
        drag_twice.commit(&mut twice);
        assert_eq!(drag_twice.commit(&mut twice), None);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_out_of_bounds_indices_ignored() {
        let mut drag = DragState::default();
        drag.begin(4, 4);
        assert!(!drag.is_dragging());

        drag.hover(1, 4);
        assert_eq!(drag.target(), None);

        drag.begin(0, 4);
        drag.hover(9, 4);
        assert_eq!(drag.target(), None);
        drag.hover(3, 4);
        assert_eq!(drag.indicator(), Some(3));
    }

    #[test]
    fn test_abort_leaves_list_alone() {
        let mut list = abcd();
        let mut drag = DragState::default();
        drag.begin(0, 4);
        drag.hover(3, 4);
        drag.abort();
        assert_eq!(drag.commit(&mut list), None);
        assert_eq!(titles(&list), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_every_move_is_a_permutation_preserving_relative_order() {
        let original = abcd();
        for from in 0..4 {
            for to in 0..4 {
                if from == to {
                    continue;
                }
                let mut list = original.clone();
                assert!(list.move_item(from, to));

                let moved = original.items()[from].id;
                assert_eq!(list.items()[to].id, moved);

                let mut sorted = list.ids();
                sorted.sort_unstable();
                assert_eq!(sorted, vec![1, 2, 3, 4]);

                let rest_before: Vec<i64> = original.ids().into_iter().filter(|id| *id != moved).collect();
                let rest_after: Vec<i64> = list.ids().into_iter().filter(|id| *id != moved).collect();
                assert_eq!(rest_before, rest_after);
            }
        }
    }

    #[test]
    fn test_submission_uses_ids_and_one_based_positions() {
        let mut list = abcd();
        list.move_item(0, 2);
        let submission = list.to_submission(CollectionId(1));
        let pairs: Vec<(i64, u32)> = submission
            .rankings
            .iter()
            .map(|r| (r.item_id, r.position))
            .collect();
        assert_eq!(pairs, vec![(2, 1), (3, 2), (1, 3), (4, 4)]);
        assert!(submission.positions_are_contiguous());
    }

    #[test]
    fn test_sort_by_ordinal() {
        let mut list = RankedList::new(vec![
            RankableItem::new(10, "Third", 3),
            RankableItem::new(11, "First", 1),
            RankableItem::new(12, "Second", 2),
        ])
        .unwrap();
        list.sort_by_ordinal();
        assert_eq!(list.ids(), vec![11, 12, 10]);
    }
}
