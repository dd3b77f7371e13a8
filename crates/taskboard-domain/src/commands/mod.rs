use taskboard_core::{ObjectId, TaskboardError, TaskboardResult};

pub mod board_commands;
pub mod card_commands;
pub mod column_commands;

pub use board_commands::*;
pub use card_commands::*;
pub use column_commands::*;

use crate::{Board, Card, Column};

/// Trait for domain commands that mutate state
/// Commands represent intent and run against the documents loaded for one unit of work
pub trait Command: Send + Sync {
    /// Execute this command, mutating the loaded documents.
    /// On error the caller discards the working copy, so partial mutation is never stored.
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}

/// Context passed to commands for mutation
/// Holds the working copies of every document the unit of work read
pub struct CommandContext<'a> {
    pub boards: &'a mut Vec<Board>,
    pub columns: &'a mut Vec<Column>,
    pub cards: &'a mut Vec<Card>,
}

impl<'a> CommandContext<'a> {
    pub fn board(&self, id: ObjectId) -> TaskboardResult<&Board> {
        self.boards
            .iter()
            .find(|b| b.id == id && !b.destroyed)
            .ok_or_else(|| TaskboardError::not_found("Board", id))
    }

    pub fn board_mut(&mut self, id: ObjectId) -> TaskboardResult<&mut Board> {
        self.boards
            .iter_mut()
            .find(|b| b.id == id && !b.destroyed)
            .ok_or_else(|| TaskboardError::not_found("Board", id))
    }

    pub fn column(&self, id: ObjectId) -> TaskboardResult<&Column> {
        self.columns
            .iter()
            .find(|c| c.id == id && !c.destroyed)
            .ok_or_else(|| TaskboardError::not_found("Column", id))
    }

    pub fn column_mut(&mut self, id: ObjectId) -> TaskboardResult<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.id == id && !c.destroyed)
            .ok_or_else(|| TaskboardError::not_found("Column", id))
    }

    pub fn card(&self, id: ObjectId) -> TaskboardResult<&Card> {
        self.cards
            .iter()
            .find(|c| c.id == id && !c.destroyed)
            .ok_or_else(|| TaskboardError::not_found("Card", id))
    }

    pub fn card_mut(&mut self, id: ObjectId) -> TaskboardResult<&mut Card> {
        self.cards
            .iter_mut()
            .find(|c| c.id == id && !c.destroyed)
            .ok_or_else(|| TaskboardError::not_found("Card", id))
    }
}
