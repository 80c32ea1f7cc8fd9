use crate::{
    domain::{
        item::{OrderedItem, PositionUpdate},
        sorting::{is_normalized, renumber, sort_by_position},
    },
    error::{OrderingError, Result},
};

/// Items of one container, kept in position order
///
/// Every mutation goes through this type. Reorder, insert and remove leave
/// positions at exactly `0..len` in array order; `replace_all` trusts the
/// positions it is given and only sorts by them.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedCollection<T> {
    container_id: String,
    items: Vec<T>,
    revision: u64,
}

impl<T: OrderedItem> OrderedCollection<T> {
    /// Creates an empty collection for a container
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            items: Vec::new(),
            revision: 0,
        }
    }

    /// Creates a collection from freshly fetched items
    pub fn from_items(container_id: impl Into<String>, items: Vec<T>) -> Self {
        let mut collection = Self::new(container_id);
        collection.replace_all(items);
        collection
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Bumped on every mutation, so observers can tell when to re-read
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Position the next appended item gets
    pub fn next_position(&self) -> u32 {
        self.items.len() as u32
    }

    pub fn is_normalized(&self) -> bool {
        is_normalized(&self.items)
    }

    /// Moves the item at `from` to `to`, shifting the items in between
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;

        if from == to {
            return Ok(());
        }

        let item = self.items.remove(from);
        self.items.insert(to, item);
        self.renumber();
        Ok(())
    }

    /// Inserts an item, clamping the index to `[0, len]`
    ///
    /// The item is adopted by this collection: its container id is set to
    /// the collection's. Returns the index it landed at.
    pub fn insert_at(&mut self, mut item: T, index: usize) -> usize {
        let index = index.min(self.items.len());
        item.set_container_id(&self.container_id);
        self.items.insert(index, item);
        self.renumber();
        index
    }

    /// Appends an item at the end
    pub fn push(&mut self, item: T) -> usize {
        self.insert_at(item, self.items.len())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        self.check_index(index)?;
        let item = self.items.remove(index);
        self.renumber();
        Ok(item)
    }

    pub fn remove_by_id(&mut self, id: &str) -> Result<T> {
        let index = self
            .index_of(id)
            .ok_or_else(|| OrderingError::NotFound(format!("{} in {}", id, self.container_id)))?;
        self.remove_at(index)
    }

    /// Replaces an item with the same id, keeping its slot and position
    pub fn update(&mut self, mut item: T) -> Result<()> {
        let index = self.index_of(item.id()).ok_or_else(|| {
            OrderingError::NotFound(format!("{} in {}", item.id(), self.container_id))
        })?;
        item.set_position(self.items[index].position());
        item.set_container_id(&self.container_id);
        self.items[index] = item;
        self.revision += 1;
        Ok(())
    }

    /// Copy of the current ordered items, used as a rollback point
    pub fn snapshot(&self) -> Vec<T> {
        self.items.clone()
    }

    /// Replaces everything with the given items, sorted by position
    pub fn replace_all(&mut self, mut items: Vec<T>) {
        sort_by_position(&mut items);
        self.items = items;
        self.revision += 1;
    }

    /// Restores a snapshot exactly as it was captured
    pub(crate) fn restore(&mut self, snapshot: Vec<T>) {
        self.items = snapshot;
        self.revision += 1;
    }

    /// The `{id, new_position}` batch describing the current order
    pub fn position_updates(&self) -> Vec<PositionUpdate> {
        self.items
            .iter()
            .map(|item| PositionUpdate::new(item.id(), item.position()))
            .collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(OrderingError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    fn renumber(&mut self) {
        renumber(&mut self.items);
        self.revision += 1;
    }
}

impl<'a, T> IntoIterator for &'a OrderedCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::Card;

    fn cards(list_id: &str, ids: &[&str]) -> OrderedCollection<Card> {
        let items = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Card::new(*id, id.to_uppercase(), list_id, i as u32))
            .collect();
        OrderedCollection::from_items(list_id, items)
    }

    fn ids(collection: &OrderedCollection<Card>) -> Vec<&str> {
        collection.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_reorder_forward() {
        let mut collection = cards("l1", &["a", "b", "c"]);

        collection.reorder(0, 2).unwrap();

        assert_eq!(ids(&collection), vec!["b", "c", "a"]);
        assert!(collection.is_normalized());
        assert_eq!(collection.get(2).unwrap().position, 2);
    }

    #[test]
    fn test_reorder_backward() {
        let mut collection = cards("l1", &["a", "b", "c", "d"]);

        collection.reorder(3, 1).unwrap();

        assert_eq!(ids(&collection), vec!["a", "d", "b", "c"]);
        assert!(collection.is_normalized());
    }

    #[test]
    fn test_reorder_every_pair_keeps_ids_and_positions() {
        let names = ["a", "b", "c", "d", "e"];
        for from in 0..names.len() {
            for to in 0..names.len() {
                let mut collection = cards("l1", &names);
                collection.reorder(from, to).unwrap();

                let mut seen = ids(&collection);
                seen.sort_unstable();
                assert_eq!(seen, names.to_vec());
                assert!(collection.is_normalized(), "from {} to {}", from, to);
                assert_eq!(collection.get(to).unwrap().id, names[from]);
            }
        }
    }

    #[test]
    fn test_reorder_same_index_is_noop() {
        let mut collection = OrderedCollection::from_items(
            "l1",
            vec![Card::new("a", "A", "l1", 10), Card::new("b", "B", "l1", 20)],
        );
        let before = collection.snapshot();
        let revision = collection.revision();

        collection.reorder(1, 1).unwrap();

        assert_eq!(collection.snapshot(), before);
        assert_eq!(collection.revision(), revision);
    }

    #[test]
    fn test_reorder_out_of_range_does_not_mutate() {
        let mut collection = cards("l1", &["a", "b"]);
        let before = collection.snapshot();
        let revision = collection.revision();

        let err = collection.reorder(0, 2).unwrap_err();
        assert!(matches!(
            err,
            OrderingError::IndexOutOfRange { index: 2, len: 2 }
        ));

        let err = collection.reorder(5, 0).unwrap_err();
        assert!(matches!(err, OrderingError::IndexOutOfRange { index: 5, .. }));

        assert_eq!(collection.snapshot(), before);
        assert_eq!(collection.revision(), revision);
    }

    #[test]
    fn test_reorder_on_empty_collection() {
        let mut collection: OrderedCollection<Card> = OrderedCollection::new("l1");
        assert!(collection.reorder(0, 0).is_err());
    }

    #[test]
    fn test_insert_at_clamps_and_adopts() {
        let mut collection = cards("l1", &["a", "b"]);

        let index = collection.insert_at(Card::new("x", "X", "elsewhere", 42), 10);

        assert_eq!(index, 2);
        assert_eq!(ids(&collection), vec!["a", "b", "x"]);
        assert_eq!(collection.get(2).unwrap().list_id, "l1");
        assert!(collection.is_normalized());
    }

    #[test]
    fn test_insert_at_front() {
        let mut collection = cards("l1", &["a", "b"]);

        collection.insert_at(Card::new("x", "X", "l1", 0), 0);

        assert_eq!(ids(&collection), vec!["x", "a", "b"]);
        assert_eq!(collection.get(1).unwrap().position, 1);
    }

    #[test]
    fn test_push_uses_next_position() {
        let mut collection = cards("l1", &["a"]);
        assert_eq!(collection.next_position(), 1);

        collection.push(Card::new("b", "B", "l1", 99));

        assert_eq!(collection.find("b").unwrap().position, 1);
        assert_eq!(collection.next_position(), 2);
    }

    #[test]
    fn test_remove_at_renumbers() {
        let mut collection = cards("l1", &["a", "b", "c"]);

        let removed = collection.remove_at(0).unwrap();

        assert_eq!(removed.id, "a");
        assert_eq!(ids(&collection), vec!["b", "c"]);
        assert!(collection.is_normalized());
        assert!(collection.remove_at(2).is_err());
    }

    #[test]
    fn test_remove_by_id() {
        let mut collection = cards("l1", &["a", "b", "c"]);

        collection.remove_by_id("b").unwrap();
        assert_eq!(ids(&collection), vec!["a", "c"]);
        assert!(collection.is_normalized());

        let err = collection.remove_by_id("b").unwrap_err();
        assert!(matches!(err, OrderingError::NotFound(_)));
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_update_keeps_slot() {
        let mut collection = cards("l1", &["a", "b", "c"]);
        let mut edited = collection.find("b").unwrap().clone();
        edited.set_title("Renamed".to_string());
        edited.position = 17;

        collection.update(edited).unwrap();

        assert_eq!(collection.get(1).unwrap().title, "Renamed");
        assert_eq!(collection.get(1).unwrap().position, 1);

        let missing = Card::new("zz", "Z", "l1", 0);
        assert!(matches!(
            collection.update(missing),
            Err(OrderingError::NotFound(_))
        ));
    }

    #[test]
    fn test_replace_all_sorts_without_renumbering() {
        let mut collection = OrderedCollection::new("l1");

        collection.replace_all(vec![
            Card::new("c", "C", "l1", 30),
            Card::new("a", "A", "l1", 10),
            Card::new("b", "B", "l1", 20),
        ]);

        assert_eq!(ids(&collection), vec!["a", "b", "c"]);
        assert_eq!(collection.get(0).unwrap().position, 10);
        assert!(!collection.is_normalized());

        // The first local mutation normalizes
        collection.reorder(0, 1).unwrap();
        assert_eq!(ids(&collection), vec!["b", "a", "c"]);
        assert!(collection.is_normalized());
    }

    #[test]
    fn test_position_updates_follow_array_order() {
        let mut collection = cards("l1", &["a", "b", "c"]);
        collection.reorder(2, 0).unwrap();

        let updates = collection.position_updates();

        assert_eq!(
            updates,
            vec![
                PositionUpdate::new("c", 0),
                PositionUpdate::new("a", 1),
                PositionUpdate::new("b", 2),
            ]
        );
    }

    #[test]
    fn test_revision_tracks_mutations() {
        let mut collection = cards("l1", &["a", "b"]);
        let start = collection.revision();

        collection.reorder(0, 1).unwrap();
        assert!(collection.revision() > start);

        let after_reorder = collection.revision();
        let _ = collection.snapshot();
        let _ = collection.position_updates();
        assert_eq!(collection.revision(), after_reorder);
    }
}
