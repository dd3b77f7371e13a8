use async_trait::async_trait;
use std::sync::Arc;
use taskboard_core::{ObjectId, TaskboardError, TaskboardResult};
use taskboard_domain::commands::{
    CreateBoard, CreateCard, CreateColumn, DeleteCard, DeleteColumn, MoveCard, UpdateBoard,
    UpdateCard, UpdateColumn,
};
use taskboard_domain::{
    Board, BoardOperations, BoardType, BoardUpdate, BoardView, Card, CardUpdate, Column,
    ColumnUpdate, ColumnView, Command, MoveCardOutcome, MoveCardRequest, NewCard,
};
use taskboard_persistence::{DocumentSet, DocumentStore, RetryPolicy, UnitOfWork};

/// Documents one attempt of an operation reads before running its command.
#[derive(Debug, Default, Clone)]
struct ReadSet {
    boards: Vec<ObjectId>,
    columns: Vec<ObjectId>,
    cards: Vec<ObjectId>,
    /// Also read the column of each listed card and the board of each listed column.
    parents: bool,
    /// Also read every live card of each listed column.
    column_cards: bool,
}

/// Runs board operations against a document store.
///
/// Every mutation is one unit of work: read, execute the command on a working
/// copy, commit the diff. Lost races are retried with fresh reads.
pub struct BoardContext {
    store: Arc<dyn DocumentStore>,
    retry: RetryPolicy,
}

impl BoardContext {
    pub fn new(store: Arc<dyn DocumentStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    async fn load(&self, reads: &ReadSet) -> TaskboardResult<DocumentSet> {
        let mut loaded = DocumentSet::default();

        for id in &reads.cards {
            loaded.extend_cards(self.store.find_card(*id).await?);
        }

        let mut column_ids = reads.columns.clone();
        if reads.parents {
            column_ids.extend(loaded.cards.iter().map(|c| c.column_id));
        }
        for id in &column_ids {
            loaded.push_column(self.store.find_column(*id).await?);
        }

        let mut board_ids = reads.boards.clone();
        if reads.parents {
            board_ids.extend(
                loaded
                    .columns
                    .iter()
                    .filter(|c| reads.columns.contains(&c.id))
                    .map(|c| c.board_id),
            );
        }
        for id in &board_ids {
            loaded.push_board(self.store.find_board(*id).await?);
        }

        if reads.column_cards {
            for id in &reads.columns {
                loaded.extend_cards(self.store.find_cards_by_column(*id).await?);
            }
        }

        Ok(loaded)
    }

    async fn attempt(&self, reads: &ReadSet, command: &dyn Command) -> TaskboardResult<DocumentSet> {
        let loaded = self.load(reads).await?;
        let mut uow = UnitOfWork::new(loaded);
        uow.execute(command)?;

        let (batch, committed) = uow.into_batch();
        if !batch.is_empty() {
            self.store.commit(batch).await?;
        }
        Ok(committed)
    }

    async fn run(
        &self,
        operation: &str,
        reads: ReadSet,
        command: &dyn Command,
    ) -> TaskboardResult<DocumentSet> {
        let reads = &reads;
        let committed = self
            .retry
            .run(operation, move || self.attempt(reads, command))
            .await;
        match &committed {
            Ok(_) => tracing::debug!(operation, backend = self.store.backend_name(), "committed"),
            Err(e) if e.is_storage() => tracing::error!(operation, error = %e, "storage failure"),
            Err(e) => tracing::debug!(operation, error = %e, "rejected"),
        }
        committed
    }
}

fn missing(kind: &str, id: ObjectId) -> TaskboardError {
    TaskboardError::Internal(format!("{} {} missing from committed documents", kind, id))
}

#[async_trait]
impl BoardOperations for BoardContext {
    async fn create_board(
        &self,
        title: String,
        description: Option<String>,
        board_type: BoardType,
    ) -> TaskboardResult<Board> {
        let command = CreateBoard::new(title, description, board_type);
        let committed = self
            .run("create_board", ReadSet::default(), &command)
            .await?;
        committed
            .board(command.board_id)
            .cloned()
            .ok_or_else(|| missing("board", command.board_id))
    }

    async fn list_boards(&self) -> TaskboardResult<Vec<Board>> {
        self.store.list_boards().await
    }

    async fn get_board(&self, id: ObjectId) -> TaskboardResult<BoardView> {
        let board = self
            .store
            .find_board(id)
            .await?
            .ok_or_else(|| TaskboardError::not_found("Board", id))?;
        let columns = self.store.find_columns_by_board(id).await?;
        let cards = self.store.find_cards_by_board(id).await?;
        Ok(BoardView::assemble(board, columns, cards))
    }

    async fn update_board(&self, id: ObjectId, updates: BoardUpdate) -> TaskboardResult<Board> {
        let command = UpdateBoard {
            board_id: id,
            updates,
        };
        let reads = ReadSet {
            boards: vec![id],
            ..Default::default()
        };
        let committed = self.run("update_board", reads, &command).await?;
        committed
            .board(id)
            .cloned()
            .ok_or_else(|| missing("board", id))
    }

    async fn create_column(
        &self,
        board_id: ObjectId,
        title: String,
    ) -> TaskboardResult<ColumnView> {
        let command = CreateColumn::new(board_id, title);
        let reads = ReadSet {
            boards: vec![board_id],
            ..Default::default()
        };
        let committed = self.run("create_column", reads, &command).await?;
        committed
            .column(command.column_id)
            .cloned()
            .map(ColumnView::empty)
            .ok_or_else(|| missing("column", command.column_id))
    }

    async fn update_column(&self, id: ObjectId, updates: ColumnUpdate) -> TaskboardResult<Column> {
        let command = UpdateColumn {
            column_id: id,
            updates,
        };
        let reads = ReadSet {
            columns: vec![id],
            ..Default::default()
        };
        let committed = self.run("update_column", reads, &command).await?;
        committed
            .column(id)
            .cloned()
            .ok_or_else(|| missing("column", id))
    }

    async fn delete_column(&self, id: ObjectId) -> TaskboardResult<()> {
        let reads = ReadSet {
            columns: vec![id],
            parents: true,
            column_cards: true,
            ..Default::default()
        };
        self.run("delete_column", reads, &DeleteColumn { column_id: id })
            .await?;
        Ok(())
    }

    async fn create_card(&self, card: NewCard) -> TaskboardResult<Card> {
        let mut command = CreateCard::new(card.board_id, card.column_id, card.title);
        command.description = card.description;
        let reads = ReadSet {
            boards: vec![card.board_id],
            columns: vec![card.column_id],
            ..Default::default()
        };
        let committed = self.run("create_card", reads, &command).await?;
        committed
            .card(command.card_id)
            .cloned()
            .ok_or_else(|| missing("card", command.card_id))
    }

    async fn get_card(&self, id: ObjectId) -> TaskboardResult<Card> {
        self.store
            .find_card(id)
            .await?
            .ok_or_else(|| TaskboardError::not_found("Card", id))
    }

    async fn update_card(&self, id: ObjectId, updates: CardUpdate) -> TaskboardResult<Card> {
        let command = UpdateCard {
            card_id: id,
            updates,
        };
        let reads = ReadSet {
            cards: vec![id],
            ..Default::default()
        };
        let committed = self.run("update_card", reads, &command).await?;
        committed.card(id).cloned().ok_or_else(|| missing("card", id))
    }

    async fn delete_card(&self, id: ObjectId) -> TaskboardResult<()> {
        let reads = ReadSet {
            cards: vec![id],
            parents: true,
            ..Default::default()
        };
        self.run("delete_card", reads, &DeleteCard { card_id: id })
            .await?;
        Ok(())
    }

    async fn move_card(&self, request: MoveCardRequest) -> TaskboardResult<MoveCardOutcome> {
        let reads = ReadSet {
            cards: vec![request.card_id],
            columns: vec![request.source_column_id, request.destination_column_id],
            ..Default::default()
        };
        let card_id = request.card_id;
        let (source_id, destination_id) = (request.source_column_id, request.destination_column_id);
        let committed = self
            .run("move_card", reads, &MoveCard { request })
            .await?;

        Ok(MoveCardOutcome {
            card: committed
                .card(card_id)
                .cloned()
                .ok_or_else(|| missing("card", card_id))?,
            prev_column: committed
                .column(source_id)
                .cloned()
                .ok_or_else(|| missing("column", source_id))?,
            next_column: committed
                .column(destination_id)
                .cloned()
                .ok_or_else(|| missing("column", destination_id))?,
        })
    }
}
