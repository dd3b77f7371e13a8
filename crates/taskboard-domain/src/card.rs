use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_core::ObjectId;

use crate::{board::BoardId, column::ColumnId, field_update::FieldUpdate};

pub type CardId = ObjectId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub title: String,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardComment {
    pub user_id: ObjectId,
    #[serde(default)]
    pub user_display_name: Option<String>,
    pub content: String,
    pub commented_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub board_id: BoardId,
    /// Must always name the column whose order array holds this card.
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<ObjectId>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub checklists: Vec<Checklist>,
    #[serde(default)]
    pub comments: Vec<CardComment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default)]
    pub version: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardUpdate {
    pub title: Option<String>,
    pub description: FieldUpdate<String>,
    pub cover: FieldUpdate<String>,
    pub labels: Option<Vec<String>>,
}

impl Card {
    pub fn new(board_id: BoardId, column_id: ColumnId, title: String) -> Self {
        Self::with_id(ObjectId::new(), board_id, column_id, title)
    }

    pub fn with_id(id: CardId, board_id: BoardId, column_id: ColumnId, title: String) -> Self {
        Self {
            id,
            board_id,
            column_id,
            title,
            description: None,
            cover: None,
            member_ids: Vec::new(),
            labels: Vec::new(),
            checklists: Vec::new(),
            comments: Vec::new(),
            attachments: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
            destroyed: false,
            version: 0,
        }
    }

    pub fn move_to_column(&mut self, column_id: ColumnId) {
        self.column_id = column_id;
        self.touch();
    }

    pub fn update(&mut self, updates: CardUpdate) {
        if let Some(title) = updates.title {
            self.title = title;
        }
        updates.description.apply_to(&mut self.description);
        updates.cover.apply_to(&mut self.cover);
        if let Some(labels) = updates.labels {
            self.labels = labels;
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_to_column() {
        let board_id = ObjectId::new();
        let from = ObjectId::new();
        let to = ObjectId::new();
        let mut card = Card::new(board_id, from, "Write release notes".to_string());

        card.move_to_column(to);
        assert_eq!(card.column_id, to);
        assert_eq!(card.board_id, board_id);
        assert!(card.updated_at.is_some());
    }

    #[test]
    fn test_update_card_fields() {
        let mut card = Card::new(ObjectId::new(), ObjectId::new(), "Draft".to_string());
        card.update(CardUpdate {
            description: FieldUpdate::Set("details".to_string()),
            cover: FieldUpdate::Set("https://cdn.example/cover.png".to_string()),
            labels: Some(vec!["bug".to_string()]),
            ..Default::default()
        });
        assert_eq!(card.title, "Draft");
        assert_eq!(card.description.as_deref(), Some("details"));
        assert_eq!(card.labels, vec!["bug".to_string()]);

        card.update(CardUpdate {
            cover: FieldUpdate::Clear,
            ..Default::default()
        });
        assert_eq!(card.cover, None);
        assert_eq!(card.description.as_deref(), Some("details"));
    }

    #[test]
    fn test_legacy_document_without_optional_fields() {
        let json = serde_json::json!({
            "id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "boardId": "65a1f0c2e4b0a1b2c3d4e5f7",
            "columnId": "65a1f0c2e4b0a1b2c3d4e5f8",
            "title": "Imported",
            "createdAt": "2024-01-12T09:30:00Z"
        });
        let card: Card = serde_json::from_value(json).unwrap();
        assert!(card.labels.is_empty());
        assert!(!card.destroyed);
        assert_eq!(card.version, 0);
    }
}
