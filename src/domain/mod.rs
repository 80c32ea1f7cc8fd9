pub mod collection;
pub mod item;
pub mod sorting;

pub use collection::OrderedCollection;
pub use item::{Card, List, OrderedItem, PositionUpdate};
pub use sorting::{is_normalized, renumber, sort_by_position};
