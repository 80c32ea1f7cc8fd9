use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entity that lives at an explicit position inside one container
///
/// Cards live in lists, lists live in boards. The container id names the
/// owning collection and the position is the rank inside it.
pub trait OrderedItem: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn position(&self) -> u32;
    fn set_position(&mut self, position: u32);
    fn container_id(&self) -> &str;
    fn set_container_id(&mut self, container_id: &str);
}

/// One `{id, new_position}` entry of a batch reorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: String,
    pub new_position: u32,
}

impl PositionUpdate {
    pub fn new(id: impl Into<String>, new_position: u32) -> Self {
        Self {
            id: id.into(),
            new_position,
        }
    }
}

/// A card on a board list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub position: u32,
    pub list_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        list_id: impl Into<String>,
        position: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            position,
            list_id: list_id.into(),
            label: None,
            label_color: None,
            due_date: None,
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the title
    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    /// Flips the completion flag
    pub fn toggle_complete(&mut self) {
        self.is_completed = !self.is_completed;
        self.updated_at = Utc::now();
    }
}

impl OrderedItem for Card {
    fn id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> u32 {
        self.position
    }

    fn set_position(&mut self, position: u32) {
        self.position = position;
    }

    fn container_id(&self) -> &str {
        &self.list_id
    }

    fn set_container_id(&mut self, container_id: &str) {
        if self.list_id != container_id {
            self.list_id = container_id.to_string();
            self.updated_at = Utc::now();
        }
    }
}

/// A list (column) on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: String,
    pub title: String,
    pub position: u32,
    pub board_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl List {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        board_id: impl Into<String>,
        position: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            position,
            board_id: board_id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl OrderedItem for List {
    fn id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> u32 {
        self.position
    }

    fn set_position(&mut self, position: u32) {
        self.position = position;
    }

    fn container_id(&self) -> &str {
        &self.board_id
    }

    fn set_container_id(&mut self, container_id: &str) {
        self.board_id = container_id.to_string();
    }
}
