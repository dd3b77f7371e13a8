//! Cross-document consistency checks.
//!
//! Every committed state must satisfy these rules; the checker reports each
//! violation it finds instead of stopping at the first one.

use std::collections::{HashMap, HashSet};
use taskboard_core::ObjectId;

use crate::{Board, Card, Column};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    DuplicateInOrder { owner: ObjectId, id: ObjectId },
    DanglingReference { owner: ObjectId, id: ObjectId },
    CardNotListed { card: ObjectId, column: ObjectId },
    CardListedElsewhere { card: ObjectId, column: ObjectId },
    ColumnNotListed { column: ObjectId, board: ObjectId },
    ColumnListedElsewhere { column: ObjectId, board: ObjectId },
}

pub fn check_invariants(boards: &[Board], columns: &[Column], cards: &[Card]) -> Vec<Violation> {
    let mut violations = Vec::new();

    let live_boards: HashMap<ObjectId, &Board> = boards
        .iter()
        .filter(|b| !b.destroyed)
        .map(|b| (b.id, b))
        .collect();
    let live_columns: HashMap<ObjectId, &Column> = columns
        .iter()
        .filter(|c| !c.destroyed)
        .map(|c| (c.id, c))
        .collect();
    let live_cards: HashMap<ObjectId, &Card> = cards
        .iter()
        .filter(|c| !c.destroyed)
        .map(|c| (c.id, c))
        .collect();

    // Which owner lists each child.
    let mut column_listed_by: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
    for board in live_boards.values() {
        check_order(board.id, &board.column_order_ids, &live_columns, &mut violations);
        for id in &board.column_order_ids {
            column_listed_by.entry(*id).or_default().push(board.id);
        }
    }

    let mut card_listed_by: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
    for column in live_columns.values() {
        check_order(column.id, &column.card_order_ids, &live_cards, &mut violations);
        for id in &column.card_order_ids {
            card_listed_by.entry(*id).or_default().push(column.id);
        }
    }

    for column in live_columns.values() {
        let owners = column_listed_by.get(&column.id).map(Vec::as_slice).unwrap_or(&[]);
        if !owners.contains(&column.board_id) {
            violations.push(Violation::ColumnNotListed {
                column: column.id,
                board: column.board_id,
            });
        }
        for owner in owners.iter().filter(|owner| **owner != column.board_id) {
            violations.push(Violation::ColumnListedElsewhere {
                column: column.id,
                board: *owner,
            });
        }
    }

    for card in live_cards.values() {
        let owners = card_listed_by.get(&card.id).map(Vec::as_slice).unwrap_or(&[]);
        if !owners.contains(&card.column_id) {
            violations.push(Violation::CardNotListed {
                card: card.id,
                column: card.column_id,
            });
        }
        for owner in owners.iter().filter(|owner| **owner != card.column_id) {
            violations.push(Violation::CardListedElsewhere {
                card: card.id,
                column: *owner,
            });
        }
    }

    violations
}

fn check_order<T>(
    owner: ObjectId,
    order: &[ObjectId],
    live: &HashMap<ObjectId, T>,
    violations: &mut Vec<Violation>,
) {
    let mut seen = HashSet::new();
    for id in order {
        if !seen.insert(*id) {
            violations.push(Violation::DuplicateInOrder { owner, id: *id });
        }
        if !live.contains_key(id) {
            violations.push(Violation::DanglingReference { owner, id: *id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoardType;

    fn consistent() -> (Vec<Board>, Vec<Column>, Vec<Card>) {
        let mut board = Board::new("Ops".to_string(), None, BoardType::Public);
        let mut column = Column::new(board.id, "Todo".to_string());
        let card = Card::new(board.id, column.id, "Patch".to_string());
        column.card_order_ids.push(card.id);
        board.column_order_ids.push(column.id);
        (vec![board], vec![column], vec![card])
    }

    #[test]
    fn test_consistent_state_has_no_violations() {
        let (boards, columns, cards) = consistent();
        assert!(check_invariants(&boards, &columns, &cards).is_empty());
    }

    #[test]
    fn test_detects_card_with_wrong_column() {
        let (boards, columns, mut cards) = consistent();
        cards[0].column_id = ObjectId::new();
        let violations = check_invariants(&boards, &columns, &cards);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::CardNotListed { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::CardListedElsewhere { .. })));
    }

    #[test]
    fn test_detects_dangling_destroyed_card() {
        let (boards, columns, mut cards) = consistent();
        cards[0].destroyed = true;
        let violations = check_invariants(&boards, &columns, &cards);
        assert_eq!(
            violations,
            vec![Violation::DanglingReference {
                owner: columns[0].id,
                id: cards[0].id
            }]
        );
    }

    #[test]
    fn test_detects_duplicates() {
        let (boards, mut columns, cards) = consistent();
        let id = cards[0].id;
        columns[0].card_order_ids.push(id);
        let violations = check_invariants(&boards, &columns, &cards);
        assert!(violations.contains(&Violation::DuplicateInOrder {
            owner: columns[0].id,
            id
        }));
    }

    #[test]
    fn test_detects_unlisted_column() {
        let (mut boards, columns, cards) = consistent();
        boards[0].column_order_ids.clear();
        let violations = check_invariants(&boards, &columns, &cards);
        assert!(violations.contains(&Violation::ColumnNotListed {
            column: columns[0].id,
            board: boards[0].id
        }));
    }
}
