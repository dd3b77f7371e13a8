use super::{Command, CommandContext};
use crate::order::{ensure_unique, same_members, OrderList};
use crate::ColumnUpdate;
use taskboard_core::{ObjectId, TaskboardError, TaskboardResult};

/// Update column properties (title, card order)
pub struct UpdateColumn {
    pub column_id: ObjectId,
    pub updates: ColumnUpdate,
}

impl Command for UpdateColumn {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let column = context.column_mut(self.column_id)?;

        if let Some(order) = &self.updates.card_order_ids {
            ensure_unique(order)?;
            if !same_members(&column.card_order_ids, order) {
                return Err(TaskboardError::Conflict(format!(
                    "supplied card order does not match the current cards of column {}",
                    column.id
                )));
            }
        }

        if let Some(title) = &self.updates.title {
            column.update_title(title.clone());
        }
        if let Some(order) = &self.updates.card_order_ids {
            column.replace_order(order.clone())?;
        }
        Ok(())
    }

    fn description(&self) -> String {
        "Update column".to_string()
    }
}

/// Create a new, empty column at the end of its board
pub struct CreateColumn {
    pub column_id: ObjectId,
    pub board_id: ObjectId,
    pub title: String,
}

impl CreateColumn {
    pub fn new(board_id: ObjectId, title: String) -> Self {
        Self {
            column_id: ObjectId::new(),
            board_id,
            title,
        }
    }
}

impl Command for CreateColumn {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let board = context.board_mut(self.board_id)?;
        board.append_to_order(self.column_id);

        let column = crate::Column::with_id(self.column_id, self.board_id, self.title.clone());
        context.columns.push(column);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create column: '{}'", self.title)
    }
}

/// Delete a column together with every card it holds
pub struct DeleteColumn {
    pub column_id: ObjectId,
}

impl Command for DeleteColumn {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let board_id = context.column(self.column_id)?.board_id;

        for card in context
            .cards
            .iter_mut()
            .filter(|c| c.column_id == self.column_id && !c.destroyed)
        {
            card.destroyed = true;
            card.touch();
        }

        let column = context.column_mut(self.column_id)?;
        column.destroyed = true;
        column.card_order_ids.clear();
        column.touch();

        context.board_mut(board_id)?.remove_from_order(self.column_id);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete column {}", self.column_id)
    }
}
