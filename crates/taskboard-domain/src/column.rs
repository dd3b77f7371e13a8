use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_core::ObjectId;

use crate::board::BoardId;
use crate::order::OrderList;

pub type ColumnId = ObjectId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    /// Canonical display order of this column's live cards.
    #[serde(default)]
    pub card_order_ids: Vec<ObjectId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default)]
    pub version: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnUpdate {
    pub title: Option<String>,
    pub card_order_ids: Option<Vec<ObjectId>>,
}

impl Column {
    pub fn new(board_id: BoardId, title: String) -> Self {
        Self::with_id(ObjectId::new(), board_id, title)
    }

    pub fn with_id(id: ColumnId, board_id: BoardId, title: String) -> Self {
        Self {
            id,
            board_id,
            title,
            card_order_ids: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
            destroyed: false,
            version: 0,
        }
    }

    pub fn update_title(&mut self, title: String) {
        self.title = title;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

impl OrderList for Column {
    fn order_ids(&self) -> &[ObjectId] {
        &self.card_order_ids
    }

    fn order_ids_mut(&mut self) -> &mut Vec<ObjectId> {
        &mut self.card_order_ids
    }

    fn touch(&mut self) {
        Column::touch(self);
    }
}
