//! Read models returned to clients.
//!
//! Column and card order come exclusively from the owners' order arrays;
//! documents missing from the arrays are not shown.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Board, Card, Column};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView {
    #[serde(flatten)]
    pub column: Column,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<ColumnView>,
}

impl ColumnView {
    pub fn empty(column: Column) -> Self {
        Self {
            column,
            cards: Vec::new(),
        }
    }

    pub fn assemble(column: Column, cards: Vec<Card>) -> Self {
        let mut by_id: HashMap<_, _> = cards
            .into_iter()
            .filter(|c| !c.destroyed && c.column_id == column.id)
            .map(|c| (c.id, c))
            .collect();
        let cards = column
            .card_order_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        Self { column, cards }
    }
}

impl BoardView {
    pub fn assemble(board: Board, columns: Vec<Column>, cards: Vec<Card>) -> Self {
        let mut cards_by_column: HashMap<_, Vec<Card>> = HashMap::new();
        for card in cards {
            cards_by_column.entry(card.column_id).or_default().push(card);
        }

        let mut by_id: HashMap<_, _> = columns
            .into_iter()
            .filter(|c| !c.destroyed && c.board_id == board.id)
            .map(|c| (c.id, c))
            .collect();
        let columns = board
            .column_order_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(|column| {
                let cards = cards_by_column.remove(&column.id).unwrap_or_default();
                ColumnView::assemble(column, cards)
            })
            .collect();

        Self { board, columns }
    }
}
