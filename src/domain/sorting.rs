use crate::domain::item::OrderedItem;

/// Sorts items by position, ascending
///
/// The sort is stable, so items that share a position keep the order the
/// backend returned them in.
///
/// # Examples
/// ```
/// use hlavi_ordering::domain::sorting::sort_by_position;
/// use hlavi_ordering::domain::item::Card;
///
/// let mut cards = vec![
///     Card::new("c", "C", "l1", 7),
///     Card::new("a", "A", "l1", 0),
///     Card::new("b", "B", "l1", 3),
/// ];
///
/// sort_by_position(&mut cards);
/// assert_eq!(cards[0].id, "a");
/// assert_eq!(cards[2].id, "c");
/// ```
pub fn sort_by_position<T: OrderedItem>(items: &mut [T]) {
    items.sort_by_key(|item| item.position());
}

/// Assigns `position = index` to every item
pub fn renumber<T: OrderedItem>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_position(index as u32);
    }
}

/// True when positions are exactly `0..len` in slice order
pub fn is_normalized<T: OrderedItem>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(index, item)| item.position() as usize == index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::{Card, List};

    #[test]
    fn test_sort_by_position_with_gaps() {
        let mut lists = vec![
            List::new("l3", "Done", "b1", 20),
            List::new("l1", "Todo", "b1", 5),
            List::new("l2", "Doing", "b1", 10),
        ];

        sort_by_position(&mut lists);

        let ids: Vec<&str> = lists.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["l1", "l2", "l3"]);
        // Sorting alone never renumbers
        assert_eq!(lists[0].position, 5);
    }

    #[test]
    fn test_sort_is_stable_for_duplicate_positions() {
        let mut cards = vec![
            Card::new("first", "1", "l1", 1),
            Card::new("zero", "0", "l1", 0),
            Card::new("second", "2", "l1", 1),
        ];

        sort_by_position(&mut cards);

        let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["zero", "first", "second"]);
    }

    #[test]
    fn test_renumber() {
        let mut cards = vec![
            Card::new("a", "A", "l1", 4),
            Card::new("b", "B", "l1", 4),
            Card::new("c", "C", "l1", 9),
        ];
        assert!(!is_normalized(&cards));

        renumber(&mut cards);

        assert!(is_normalized(&cards));
        assert_eq!(cards[2].position, 2);
    }

    #[test]
    fn test_empty_slice_is_normalized() {
        let cards: Vec<Card> = Vec::new();
        assert!(is_normalized(&cards));
    }
}
