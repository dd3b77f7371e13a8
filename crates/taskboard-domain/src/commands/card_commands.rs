use super::{Command, CommandContext};
use crate::moving::{plan_move, MoveCardRequest};
use crate::order::OrderList;
use crate::CardUpdate;
use taskboard_core::{ObjectId, TaskboardError, TaskboardResult};

/// Update card properties (title, description, cover, labels)
pub struct UpdateCard {
    pub card_id: ObjectId,
    pub updates: CardUpdate,
}

impl Command for UpdateCard {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        context.card_mut(self.card_id)?.update(self.updates.clone());
        Ok(())
    }

    fn description(&self) -> String {
        "Update card".to_string()
    }
}

/// Create a new card at the end of a column
pub struct CreateCard {
    pub card_id: ObjectId,
    pub board_id: ObjectId,
    pub column_id: ObjectId,
    pub title: String,
    pub description: Option<String>,
}

impl CreateCard {
    pub fn new(board_id: ObjectId, column_id: ObjectId, title: String) -> Self {
        Self {
            card_id: ObjectId::new(),
            board_id,
            column_id,
            title,
            description: None,
        }
    }
}

impl Command for CreateCard {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        context.board(self.board_id)?;
        let column = context.column_mut(self.column_id)?;
        if column.board_id != self.board_id {
            return Err(TaskboardError::Consistency(format!(
                "column {} does not belong to board {}",
                self.column_id, self.board_id
            )));
        }
        column.append_to_order(self.card_id);

        let mut card = crate::Card::with_id(
            self.card_id,
            self.board_id,
            self.column_id,
            self.title.clone(),
        );
        card.description = self.description.clone();
        context.cards.push(card);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create card: '{}'", self.title)
    }
}

/// Soft-delete a card and pull it out of its column
pub struct DeleteCard {
    pub card_id: ObjectId,
}

impl Command for DeleteCard {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let card = context.card_mut(self.card_id)?;
        card.destroyed = true;
        card.touch();
        let column_id = card.column_id;

        context.column_mut(column_id)?.remove_from_order(self.card_id);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete card {}", self.card_id)
    }
}

/// Move a card within its column or into another column of the same board
pub struct MoveCard {
    pub request: MoveCardRequest,
}

impl Command for MoveCard {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let request = &self.request;
        let (card_board, card_column) = {
            let card = context.card(request.card_id)?;
            (card.board_id, card.column_id)
        };

        let source = context.column(request.source_column_id)?;
        let destination = if request.is_in_column() {
            None
        } else {
            Some(context.column(request.destination_column_id)?)
        };

        if card_column != source.id {
            return Err(TaskboardError::Conflict(format!(
                "card {} is in column {}, not {}",
                request.card_id, card_column, source.id
            )));
        }
        for column in std::iter::once(source).chain(destination) {
            if column.board_id != card_board {
                return Err(TaskboardError::Consistency(format!(
                    "column {} does not belong to board {}",
                    column.id, card_board
                )));
            }
        }

        let plan = plan_move(request.card_id, source, destination, &request.placement)?;

        context
            .column_mut(request.source_column_id)?
            .replace_order(plan.source)?;
        if let Some(destination_order) = plan.destination {
            context
                .column_mut(request.destination_column_id)?
                .replace_order(destination_order)?;
            context
                .card_mut(request.card_id)?
                .move_to_column(request.destination_column_id);
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Move card {} from column {} to column {}",
            self.request.card_id, self.request.source_column_id, self.request.destination_column_id
        )
    }
}
