//! Identity-preserving list mutation
//!
//! Each function either completes (with `order` re-derived as a dense 1..N
//! sequence) or rejects without touching the list.

use crate::error::MutationError;

/// A list element carrying a dense position
pub trait Ordered {
    /// Current position
    fn order(&self) -> u32;

    /// Overwrite the position
    fn set_order(&mut self, order: u32);
}

/// Re-derive `order` from list position
pub fn renumber<T: Ordered>(items: &mut [T]) {
    for (item, order) in items.iter_mut().zip(1u32..) {
        item.set_order(order);
    }
}

/// Push to the end
pub fn append<T: Ordered>(items: &mut Vec<T>, item: T) {
    items.push(item);
    renumber(items);
}

/// Move the element at `from` so it ends up at `to`
///
/// # Errors
/// Returns [`MutationError::IndexOutOfBounds`] if either index is past the end
pub fn move_item<T: Ordered>(items: &mut [T], from: usize, to: usize) -> Result<(), MutationError> {
    check_index(items, from)?;
    check_index(items, to)?;
    if from < to {
        items[from..=to].rotate_left(1);
    } else if from > to {
        items[to..=from].rotate_right(1);
    }
    renumber(items);
    Ok(())
}

/// Remove and return the element at `index`
///
/// # Errors
/// Returns [`MutationError::IndexOutOfBounds`] if `index` is past the end
pub fn remove_at<T: Ordered>(items: &mut Vec<T>, index: usize) -> Result<T, MutationError> {
    check_index(items, index)?;
    let removed = items.remove(index);
    renumber(items);
    Ok(removed)
}

/// Reject indices past the end
///
/// # Errors
/// Returns [`MutationError::IndexOutOfBounds`]
pub fn check_index<T>(items: &[T], index: usize) -> Result<(), MutationError> {
    if index < items.len() {
        Ok(())
    } else {
        Err(MutationError::IndexOutOfBounds {
            index,
            len: items.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row {
        tag: char,
        order: u32,
    }

    impl Ordered for Row {
        fn order(&self) -> u32 {
            self.order
        }

        fn set_order(&mut self, order: u32) {
            self.order = order;
        }
    }

    fn rows(tags: &str) -> Vec<Row> {
        let mut rows: Vec<Row> = tags.chars().map(|tag| Row { tag, order: 0 }).collect();
        renumber(&mut rows);
        rows
    }

    fn tags(rows: &[Row]) -> String {
        rows.iter().map(|r| r.tag).collect()
    }

    fn is_dense(rows: &[Row]) -> bool {
        rows.iter().zip(1u32..).all(|(row, n)| row.order == n)
    }

    #[test]
    fn move_forward_and_back() {
        let mut list = rows("abcd");
        move_item(&mut list, 0, 2).unwrap();
        assert_eq!(tags(&list), "bcad");
        move_item(&mut list, 3, 0).unwrap();
        assert_eq!(tags(&list), "dbca");
        assert!(is_dense(&list));
    }

    #[test]
    fn move_to_same_index_is_noop() {
        let mut list = rows("abc");
        move_item(&mut list, 1, 1).unwrap();
        assert_eq!(tags(&list), "abc");
    }

    #[test]
    fn out_of_range_rejected_without_mutation() {
        let mut list = rows("abc");
        let before = list.clone();
        assert_eq!(
            move_item(&mut list, 0, 3),
            Err(MutationError::IndexOutOfBounds { index: 3, len: 3 })
        );
        assert!(remove_at(&mut list, 5).is_err());
        assert_eq!(list, before);
    }

    #[test]
    fn remove_renumbers() {
        let mut list = rows("abcd");
        let removed = remove_at(&mut list, 1).unwrap();
        assert_eq!(removed.tag, 'b');
        assert_eq!(tags(&list), "acd");
        assert!(is_dense(&list));
    }

    #[test]
    fn append_takes_next_order() {
        let mut list = rows("ab");
        append(&mut list, Row { tag: 'z', order: 99 });
        assert_eq!(list[2].order, 3);
    }

    fn arb_moves() -> impl Strategy<Value = Vec<(usize, usize)>> {
        prop::collection::vec((0usize..8, 0usize..8), 0..32)
    }

    proptest! {
        #[test]
        fn moves_keep_order_dense_and_elements_intact(moves in arb_moves()) {
            let mut list = rows("abcdefgh");
            for (from, to) in moves {
                move_item(&mut list, from, to).unwrap();
                prop_assert!(is_dense(&list));
            }
            let mut sorted: Vec<char> = tags(&list).chars().collect();
            sorted.sort_unstable();
            prop_assert_eq!(sorted.into_iter().collect::<String>(), "abcdefgh");
        }
    }
}
