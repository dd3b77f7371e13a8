use crate::{
    Board, BoardType, BoardUpdate, BoardView, Card, CardUpdate, Column, ColumnUpdate, ColumnView,
    MoveCardOutcome, MoveCardRequest,
};
use async_trait::async_trait;
use taskboard_core::{ObjectId, TaskboardResult};

/// Input for creating a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub board_id: ObjectId,
    pub column_id: ObjectId,
    pub title: String,
    pub description: Option<String>,
}

/// Every operation the backend exposes.
/// Inputs are already validated; implementations enforce the ordering invariants.
#[async_trait]
pub trait BoardOperations: Send + Sync {
    // Board operations
    async fn create_board(
        &self,
        title: String,
        description: Option<String>,
        board_type: BoardType,
    ) -> TaskboardResult<Board>;
    async fn list_boards(&self) -> TaskboardResult<Vec<Board>>;
    async fn get_board(&self, id: ObjectId) -> TaskboardResult<BoardView>;
    async fn update_board(&self, id: ObjectId, updates: BoardUpdate) -> TaskboardResult<Board>;

    // Column operations
    async fn create_column(&self, board_id: ObjectId, title: String)
        -> TaskboardResult<ColumnView>;
    async fn update_column(&self, id: ObjectId, updates: ColumnUpdate) -> TaskboardResult<Column>;
    async fn delete_column(&self, id: ObjectId) -> TaskboardResult<()>;

    // Card operations
    async fn create_card(&self, card: NewCard) -> TaskboardResult<Card>;
    async fn get_card(&self, id: ObjectId) -> TaskboardResult<Card>;
    async fn update_card(&self, id: ObjectId, updates: CardUpdate) -> TaskboardResult<Card>;
    async fn delete_card(&self, id: ObjectId) -> TaskboardResult<()>;
    async fn move_card(&self, request: MoveCardRequest) -> TaskboardResult<MoveCardOutcome>;
}
