pub mod board;
pub mod card;
pub mod column;
pub mod commands;
pub mod field_update;
pub mod invariants;
pub mod moving;
pub mod operations;
pub mod order;
pub mod projection;

pub use board::{Board, BoardId, BoardType, BoardUpdate};
pub use card::{Attachment, Card, CardComment, CardId, CardUpdate, Checklist, ChecklistItem};
pub use column::{Column, ColumnId, ColumnUpdate};
pub use commands::{Command, CommandContext};
pub use field_update::FieldUpdate;
pub use invariants::{check_invariants, Violation};
pub use moving::{CardPlacement, MoveCardOutcome, MoveCardRequest, PlannedOrders};
pub use operations::{BoardOperations, NewCard};
pub use order::OrderList;
pub use projection::{BoardView, ColumnView};
