use super::{Command, CommandContext};
use crate::order::{ensure_unique, same_members, OrderList};
use crate::{Board, BoardType, BoardUpdate};
use taskboard_core::{ObjectId, TaskboardError, TaskboardResult};

/// Create a new, empty board
pub struct CreateBoard {
    pub board_id: ObjectId,
    pub title: String,
    pub description: Option<String>,
    pub board_type: BoardType,
    pub owner_id: Option<ObjectId>,
}

impl CreateBoard {
    pub fn new(title: String, description: Option<String>, board_type: BoardType) -> Self {
        Self {
            board_id: ObjectId::new(),
            title,
            description,
            board_type,
            owner_id: None,
        }
    }
}

impl Command for CreateBoard {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let mut board = Board::with_id(
            self.board_id,
            self.title.clone(),
            self.description.clone(),
            self.board_type,
        );
        if let Some(owner) = self.owner_id {
            board.owner_ids.push(owner);
        }
        context.boards.push(board);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create board: '{}'", self.title)
    }
}

/// Update board properties and, optionally, the order of its columns
pub struct UpdateBoard {
    pub board_id: ObjectId,
    pub updates: BoardUpdate,
}

impl Command for UpdateBoard {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let board = context.board_mut(self.board_id)?;

        if let Some(order) = &self.updates.column_order_ids {
            ensure_unique(order)?;
            if !same_members(&board.column_order_ids, order) {
                return Err(TaskboardError::Conflict(format!(
                    "supplied column order does not match the current columns of board {}",
                    board.id
                )));
            }
        }

        let mut updates = self.updates.clone();
        let order = updates.column_order_ids.take();
        board.update(updates);
        if let Some(order) = order {
            board.replace_order(order)?;
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Update board {}", self.board_id)
    }
}
