//! Card relocation planning.
//!
//! A move either reorders a card inside its column or carries it to another
//! column. Clients usually compute the resulting order arrays themselves after
//! a drag-and-drop; they may instead send only a destination index and let the
//! server derive both arrays. Either way the plan is checked against the
//! stored columns before anything is written.

use serde::{Deserialize, Serialize};
use taskboard_core::{ObjectId, TaskboardError, TaskboardResult};

use crate::order::{ensure_unique, same_members};
use crate::{Card, CardId, Column, ColumnId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardPlacement {
    /// Insert at this 0-based position of the destination column.
    AtIndex(usize),
    /// Client-computed arrays for both columns after the move.
    Explicit {
        source_order: Vec<ObjectId>,
        destination_order: Vec<ObjectId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCardRequest {
    pub card_id: CardId,
    pub source_column_id: ColumnId,
    pub destination_column_id: ColumnId,
    pub placement: CardPlacement,
}

impl MoveCardRequest {
    pub fn is_in_column(&self) -> bool {
        self.source_column_id == self.destination_column_id
    }
}

/// New order arrays for the columns touched by a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOrders {
    pub source: Vec<ObjectId>,
    /// `None` for an in-column reorder.
    pub destination: Option<Vec<ObjectId>>,
}

/// State returned to the caller after a successful move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardOutcome {
    pub card: Card,
    pub prev_column: Column,
    pub next_column: Column,
}

/// Compute the order arrays a move produces.
///
/// `destination` must be `None` exactly when the move stays inside `source`.
/// The card must already sit in `source`.
pub fn plan_move(
    card_id: CardId,
    source: &Column,
    destination: Option<&Column>,
    placement: &CardPlacement,
) -> TaskboardResult<PlannedOrders> {
    if !source.card_order_ids.contains(&card_id) {
        return Err(TaskboardError::Conflict(format!(
            "card {} is no longer in column {}",
            card_id, source.id
        )));
    }

    match destination {
        None => plan_reorder(card_id, source, placement),
        Some(destination) => plan_transfer(card_id, source, destination, placement),
    }
}

fn plan_reorder(
    card_id: CardId,
    column: &Column,
    placement: &CardPlacement,
) -> TaskboardResult<PlannedOrders> {
    let order = match placement {
        CardPlacement::AtIndex(index) => {
            let mut order: Vec<ObjectId> = column
                .card_order_ids
                .iter()
                .copied()
                .filter(|id| *id != card_id)
                .collect();
            let at = (*index).min(order.len());
            order.insert(at, card_id);
            order
        }
        CardPlacement::Explicit {
            source_order,
            destination_order,
        } => {
            if !destination_order.is_empty() && destination_order != source_order {
                return Err(TaskboardError::Consistency(
                    "an in-column reorder received two different card orders".to_string(),
                ));
            }
            ensure_unique(source_order)?;
            if !source_order.contains(&card_id) {
                return Err(TaskboardError::Consistency(format!(
                    "the new order of column {} does not contain card {}",
                    column.id, card_id
                )));
            }
            ensure_same_cards(column, source_order)?;
            source_order.clone()
        }
    };

    Ok(PlannedOrders {
        source: order,
        destination: None,
    })
}

fn plan_transfer(
    card_id: CardId,
    source: &Column,
    destination: &Column,
    placement: &CardPlacement,
) -> TaskboardResult<PlannedOrders> {
    match placement {
        CardPlacement::AtIndex(index) => {
            let source_order: Vec<ObjectId> = source
                .card_order_ids
                .iter()
                .copied()
                .filter(|id| *id != card_id)
                .collect();
            let mut destination_order: Vec<ObjectId> = destination
                .card_order_ids
                .iter()
                .copied()
                .filter(|id| *id != card_id)
                .collect();
            let at = (*index).min(destination_order.len());
            destination_order.insert(at, card_id);

            Ok(PlannedOrders {
                source: source_order,
                destination: Some(destination_order),
            })
        }
        CardPlacement::Explicit {
            source_order,
            destination_order,
        } => {
            ensure_unique(source_order)?;
            ensure_unique(destination_order)?;

            let in_source = source_order.contains(&card_id);
            let in_destination = destination_order.contains(&card_id);
            match (in_source, in_destination) {
                (false, true) => {}
                (false, false) => {
                    return Err(TaskboardError::Consistency(format!(
                        "card {} is missing from both supplied orders",
                        card_id
                    )))
                }
                (true, true) => {
                    return Err(TaskboardError::Consistency(format!(
                        "card {} is present in both supplied orders",
                        card_id
                    )))
                }
                (true, false) => {
                    return Err(TaskboardError::Consistency(format!(
                        "card {} is still in the source order and absent from the destination",
                        card_id
                    )))
                }
            }

            let mut expected_source = source_order.clone();
            expected_source.push(card_id);
            ensure_same_cards(source, &expected_source)?;

            let expected_destination: Vec<ObjectId> = destination_order
                .iter()
                .copied()
                .filter(|id| *id != card_id)
                .collect();
            ensure_same_cards(destination, &expected_destination)?;

            Ok(PlannedOrders {
                source: source_order.clone(),
                destination: Some(destination_order.clone()),
            })
        }
    }
}

/// A supplied order that names different cards than the stored column means
/// the caller planned against state that has since changed.
fn ensure_same_cards(column: &Column, supplied: &[ObjectId]) -> TaskboardResult<()> {
    if same_members(&column.card_order_ids, supplied) {
        Ok(())
    } else {
        Err(TaskboardError::Conflict(format!(
            "supplied order does not match the current cards of column {}",
            column.id
        )))
    }
}
