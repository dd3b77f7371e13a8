use crate::conflict::{check_version, ExpectedVersion};
use crate::traits::DocumentStore;
use crate::unit_of_work::{DocumentKind, Versioned, WriteBatch};
use async_trait::async_trait;
use std::collections::HashMap;
use taskboard_core::{ObjectId, TaskboardResult};
use taskboard_domain::{Board, Card, Column};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    boards: HashMap<ObjectId, Board>,
    columns: HashMap<ObjectId, Column>,
    cards: HashMap<ObjectId, Card>,
}

impl Tables {
    fn stored_version(&self, kind: DocumentKind, id: ObjectId) -> Option<u64> {
        match kind {
            DocumentKind::Board => self.boards.get(&id).map(|b| b.version),
            DocumentKind::Column => self.columns.get(&id).map(|c| c.version),
            DocumentKind::Card => self.cards.get(&id).map(|c| c.version),
        }
    }

    /// Every expectation in the batch, checked before anything is written.
    fn validate(&self, batch: &WriteBatch) -> TaskboardResult<()> {
        for guard in &batch.guards {
            check_version(
                guard.kind,
                guard.id,
                ExpectedVersion::Exactly(guard.version),
                self.stored_version(guard.kind, guard.id),
            )?;
        }
        self.validate_writes(&batch.inserts.boards, &batch.updates.boards)?;
        self.validate_writes(&batch.inserts.columns, &batch.updates.columns)?;
        self.validate_writes(&batch.inserts.cards, &batch.updates.cards)?;
        Ok(())
    }

    fn validate_writes<T: Versioned>(&self, inserts: &[T], updates: &[T]) -> TaskboardResult<()> {
        for doc in inserts {
            check_version(
                T::KIND,
                doc.id(),
                ExpectedVersion::Absent,
                self.stored_version(T::KIND, doc.id()),
            )?;
        }
        for doc in updates {
            check_version(
                T::KIND,
                doc.id(),
                ExpectedVersion::Exactly(doc.version().saturating_sub(1)),
                self.stored_version(T::KIND, doc.id()),
            )?;
        }
        Ok(())
    }

    fn apply(&mut self, batch: WriteBatch) {
        let WriteBatch {
            inserts, updates, ..
        } = batch;
        for card in inserts.cards.into_iter().chain(updates.cards) {
            self.cards.insert(card.id, card);
        }
        for column in inserts.columns.into_iter().chain(updates.columns) {
            self.columns.insert(column.id, column);
        }
        for board in inserts.boards.into_iter().chain(updates.boards) {
            self.boards.insert(board.id, board);
        }
    }
}

/// In-process document store.
///
/// A commit holds the write lock from validation to the last write without
/// yielding, so a cancelled request can never leave half a batch applied.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_board(&self, id: ObjectId) -> TaskboardResult<Option<Board>> {
        let tables = self.tables.read().await;
        Ok(tables.boards.get(&id).filter(|b| !b.destroyed).cloned())
    }

    async fn find_column(&self, id: ObjectId) -> TaskboardResult<Option<Column>> {
        let tables = self.tables.read().await;
        Ok(tables.columns.get(&id).filter(|c| !c.destroyed).cloned())
    }

    async fn find_card(&self, id: ObjectId) -> TaskboardResult<Option<Card>> {
        let tables = self.tables.read().await;
        Ok(tables.cards.get(&id).filter(|c| !c.destroyed).cloned())
    }

    async fn list_boards(&self) -> TaskboardResult<Vec<Board>> {
        let tables = self.tables.read().await;
        let mut boards: Vec<Board> = tables
            .boards
            .values()
            .filter(|b| !b.destroyed)
            .cloned()
            .collect();
        boards.sort_by_key(|b| (b.created_at, b.id));
        Ok(boards)
    }

    async fn find_columns_by_board(&self, board_id: ObjectId) -> TaskboardResult<Vec<Column>> {
        let tables = self.tables.read().await;
        Ok(tables
            .columns
            .values()
            .filter(|c| c.board_id == board_id && !c.destroyed)
            .cloned()
            .collect())
    }

    async fn find_cards_by_board(&self, board_id: ObjectId) -> TaskboardResult<Vec<Card>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cards
            .values()
            .filter(|c| c.board_id == board_id && !c.destroyed)
            .cloned()
            .collect())
    }

    async fn find_cards_by_column(&self, column_id: ObjectId) -> TaskboardResult<Vec<Card>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cards
            .values()
            .filter(|c| c.column_id == column_id && !c.destroyed)
            .cloned()
            .collect())
    }

    async fn commit(&self, batch: WriteBatch) -> TaskboardResult<()> {
        let mut tables = self.tables.write().await;
        if let Err(e) = tables.validate(&batch) {
            tracing::debug!(error = %e, "rejected batch");
            return Err(e);
        }
        let writes = batch.write_count();
        tables.apply(batch);
        tracing::debug!(writes, "committed batch");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
