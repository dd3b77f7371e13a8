use async_trait::async_trait;
use taskboard_core::{ObjectId, TaskboardResult};
use taskboard_domain::{Board, Card, Column};

use crate::unit_of_work::WriteBatch;

/// Trait for document storage backends
/// Lookups never return destroyed documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_board(&self, id: ObjectId) -> TaskboardResult<Option<Board>>;

    async fn find_column(&self, id: ObjectId) -> TaskboardResult<Option<Column>>;

    async fn find_card(&self, id: ObjectId) -> TaskboardResult<Option<Card>>;

    /// All live boards, oldest first
    async fn list_boards(&self) -> TaskboardResult<Vec<Board>>;

    async fn find_columns_by_board(&self, board_id: ObjectId) -> TaskboardResult<Vec<Column>>;

    async fn find_cards_by_board(&self, board_id: ObjectId) -> TaskboardResult<Vec<Card>>;

    async fn find_cards_by_column(&self, column_id: ObjectId) -> TaskboardResult<Vec<Card>>;

    /// Apply every write in the batch or none of them.
    /// Fails with `TaskboardError::Conflict` when any guarded or updated
    /// document no longer has the expected version.
    async fn commit(&self, batch: WriteBatch) -> TaskboardResult<()>;

    /// Short backend name used in logs
    fn backend_name(&self) -> &'static str;
}
