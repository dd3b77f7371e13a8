use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use taskboard_core::{ObjectId, TaskboardError};

use crate::field_update::FieldUpdate;
use crate::order::OrderList;

pub type BoardId = ObjectId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardType {
    #[default]
    Public,
    Private,
}

impl FromStr for BoardType {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(TaskboardError::Validation(format!(
                "\"type\" must be one of [public, private], got {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for BoardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Private => f.write_str("private"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub board_type: BoardType,
    /// Canonical display order of this board's live columns.
    #[serde(default)]
    pub column_order_ids: Vec<ObjectId>,
    #[serde(default)]
    pub owner_ids: Vec<ObjectId>,
    #[serde(default)]
    pub member_ids: Vec<ObjectId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub destroyed: bool,
    /// Optimistic concurrency token, zero until first stored.
    #[serde(default)]
    pub version: u64,
}

/// Partial update of board properties. Column order is handled separately
/// because it must be checked against the stored order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardUpdate {
    pub title: Option<String>,
    pub description: FieldUpdate<String>,
    pub board_type: Option<BoardType>,
    pub column_order_ids: Option<Vec<ObjectId>>,
}

impl Board {
    pub fn new(title: String, description: Option<String>, board_type: BoardType) -> Self {
        Self::with_id(ObjectId::new(), title, description, board_type)
    }

    pub fn with_id(
        id: BoardId,
        title: String,
        description: Option<String>,
        board_type: BoardType,
    ) -> Self {
        Self {
            id,
            title,
            description,
            board_type,
            column_order_ids: Vec::new(),
            owner_ids: Vec::new(),
            member_ids: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
            destroyed: false,
            version: 0,
        }
    }

    pub fn update(&mut self, updates: BoardUpdate) {
        if let Some(title) = updates.title {
            self.title = title;
        }
        updates.description.apply_to(&mut self.description);
        if let Some(board_type) = updates.board_type {
            self.board_type = board_type;
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

impl OrderList for Board {
    fn order_ids(&self) -> &[ObjectId] {
        &self.column_order_ids
    }

    fn order_ids_mut(&mut self) -> &mut Vec<ObjectId> {
        &mut self.column_order_ids
    }

    fn touch(&mut self) {
        Board::touch(self);
    }
}
