use crate::traits::DocumentStore;
use crate::unit_of_work::{DocumentKind, Versioned, WriteBatch};
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqliteConnection};
use std::path::{Path, PathBuf};
use std::time::Duration;
use taskboard_core::{ObjectId, TaskboardError, TaskboardResult};
use taskboard_domain::{Board, Card, Column};

const SCHEMA: &str = include_str!("../schema.sql");

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A document type and the table it lives in.
trait StoredDocument: Versioned + Serialize + DeserializeOwned + Send + Sync {
    const TABLE: &'static str;

    /// Indexed lookup columns besides `id`, `version` and `destroyed`.
    fn keys(&self) -> Vec<(&'static str, String)>;

    fn is_destroyed(&self) -> bool;
}

impl StoredDocument for Board {
    const TABLE: &'static str = "boards";

    fn keys(&self) -> Vec<(&'static str, String)> {
        vec![(
            "created_at",
            self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        )]
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl StoredDocument for Column {
    const TABLE: &'static str = "columns";

    fn keys(&self) -> Vec<(&'static str, String)> {
        vec![("board_id", self.board_id.to_string())]
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl StoredDocument for Card {
    const TABLE: &'static str = "cards";

    fn keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("board_id", self.board_id.to_string()),
            ("column_id", self.column_id.to_string()),
        ]
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

fn table_for(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Board => Board::TABLE,
        DocumentKind::Column => Column::TABLE,
        DocumentKind::Card => Card::TABLE,
    }
}

fn db_err(e: sqlx::Error) -> TaskboardError {
    TaskboardError::Database(e.to_string())
}

fn to_i64(version: u64) -> TaskboardResult<i64> {
    i64::try_from(version)
        .map_err(|_| TaskboardError::Internal(format!("version {} out of range", version)))
}

fn stale(kind: DocumentKind, id: ObjectId) -> TaskboardError {
    TaskboardError::Conflict(format!("{} {} was modified concurrently", kind, id))
}

fn decode<T: DeserializeOwned>(body: &str) -> TaskboardResult<T> {
    serde_json::from_str(body).map_err(|e| TaskboardError::Serialization(e.to_string()))
}

fn encode<T: Serialize>(doc: &T) -> TaskboardResult<String> {
    serde_json::to_string(doc).map_err(|e| TaskboardError::Serialization(e.to_string()))
}

/// SQLite-backed document store.
///
/// Each commit runs in one transaction. Version checks are conditional
/// updates, so the first statement already takes the write lock and a
/// mismatch rolls everything back when the transaction is dropped.
pub struct SqliteStore {
    path: PathBuf,
    pool: tokio::sync::OnceCell<Pool<Sqlite>>,
}

impl SqliteStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pool: tokio::sync::OnceCell::new(),
        }
    }

    /// Open the database now instead of on first use.
    pub async fn connect(path: impl AsRef<Path>) -> TaskboardResult<Self> {
        let store = Self::new(path);
        store.get_pool().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn get_pool(&self) -> TaskboardResult<&Pool<Sqlite>> {
        self.pool
            .get_or_try_init(|| async {
                let options = SqliteConnectOptions::new()
                    .filename(&self.path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .busy_timeout(BUSY_TIMEOUT);

                let pool = SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect_with(options)
                    .await
                    .map_err(db_err)?;

                sqlx::raw_sql(SCHEMA).execute(&pool).await.map_err(db_err)?;

                tracing::info!("Opened SQLite database at {}", self.path.display());
                Ok(pool)
            })
            .await
    }

    async fn fetch_by_id<T: StoredDocument>(&self, id: ObjectId) -> TaskboardResult<Option<T>> {
        let pool = self.get_pool().await?;
        let sql = format!(
            "SELECT body FROM {} WHERE id = ? AND destroyed = 0",
            T::TABLE
        );
        let body: Option<String> = sqlx::query_scalar::<_, String>(&sql)
            .bind(id.to_string())
            .fetch_optional(pool)
            .await
            .map_err(db_err)?;
        body.as_deref().map(decode).transpose()
    }

    async fn fetch_where<T: StoredDocument>(
        &self,
        key: &str,
        value: ObjectId,
    ) -> TaskboardResult<Vec<T>> {
        let pool = self.get_pool().await?;
        let sql = format!(
            "SELECT body FROM {} WHERE {} = ? AND destroyed = 0 ORDER BY rowid",
            T::TABLE,
            key
        );
        let bodies: Vec<String> = sqlx::query_scalar::<_, String>(&sql)
            .bind(value.to_string())
            .fetch_all(pool)
            .await
            .map_err(db_err)?;
        bodies.iter().map(|body| decode(body)).collect()
    }
}

async fn insert_all<T: StoredDocument>(
    conn: &mut SqliteConnection,
    docs: &[T],
) -> TaskboardResult<()> {
    for doc in docs {
        let keys = doc.keys();
        let names: Vec<&str> = keys.iter().map(|(name, _)| *name).collect();
        let sql = format!(
            "INSERT OR IGNORE INTO {} (id, version, destroyed, {}, body) VALUES (?, ?, ?, {}, ?)",
            T::TABLE,
            names.join(", "),
            vec!["?"; names.len()].join(", ")
        );

        let mut query = sqlx::query(&sql)
            .bind(doc.id().to_string())
            .bind(to_i64(doc.version())?)
            .bind(doc.is_destroyed());
        for (_, value) in keys {
            query = query.bind(value);
        }
        let affected = query
            .bind(encode(doc)?)
            .execute(&mut *conn)
            .await
            .map_err(db_err)?
            .rows_affected();
        if affected == 0 {
            return Err(TaskboardError::Conflict(format!(
                "{} {} already exists",
                T::KIND,
                doc.id()
            )));
        }
    }
    Ok(())
}

async fn update_all<T: StoredDocument>(
    conn: &mut SqliteConnection,
    docs: &[T],
) -> TaskboardResult<()> {
    for doc in docs {
        let keys = doc.keys();
        let assignments: Vec<String> = keys.iter().map(|(name, _)| format!("{} = ?", name)).collect();
        let sql = format!(
            "UPDATE {} SET version = ?, destroyed = ?, {}, body = ? WHERE id = ? AND version = ?",
            T::TABLE,
            assignments.join(", ")
        );

        let mut query = sqlx::query(&sql)
            .bind(to_i64(doc.version())?)
            .bind(doc.is_destroyed());
        for (_, value) in keys {
            query = query.bind(value);
        }
        let affected = query
            .bind(encode(doc)?)
            .bind(doc.id().to_string())
            .bind(to_i64(doc.version().saturating_sub(1))?)
            .execute(&mut *conn)
            .await
            .map_err(db_err)?
            .rows_affected();
        if affected == 0 {
            return Err(stale(T::KIND, doc.id()));
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find_board(&self, id: ObjectId) -> TaskboardResult<Option<Board>> {
        self.fetch_by_id(id).await
    }

    async fn find_column(&self, id: ObjectId) -> TaskboardResult<Option<Column>> {
        self.fetch_by_id(id).await
    }

    async fn find_card(&self, id: ObjectId) -> TaskboardResult<Option<Card>> {
        self.fetch_by_id(id).await
    }

    async fn list_boards(&self) -> TaskboardResult<Vec<Board>> {
        let pool = self.get_pool().await?;
        let bodies: Vec<String> = sqlx::query_scalar::<_, String>(
            "SELECT body FROM boards WHERE destroyed = 0 ORDER BY created_at, id",
        )
        .fetch_all(pool)
        .await
        .map_err(db_err)?;
        bodies.iter().map(|body| decode(body)).collect()
    }

    async fn find_columns_by_board(&self, board_id: ObjectId) -> TaskboardResult<Vec<Column>> {
        self.fetch_where("board_id", board_id).await
    }

    async fn find_cards_by_board(&self, board_id: ObjectId) -> TaskboardResult<Vec<Card>> {
        self.fetch_where("board_id", board_id).await
    }

    async fn find_cards_by_column(&self, column_id: ObjectId) -> TaskboardResult<Vec<Card>> {
        self.fetch_where("column_id", column_id).await
    }

    async fn commit(&self, batch: WriteBatch) -> TaskboardResult<()> {
        let pool = self.get_pool().await?;
        let mut tx = pool.begin().await.map_err(db_err)?;

        for guard in &batch.guards {
            let sql = format!(
                "UPDATE {} SET version = version WHERE id = ? AND version = ?",
                table_for(guard.kind)
            );
            let affected = sqlx::query(&sql)
                .bind(guard.id.to_string())
                .bind(to_i64(guard.version)?)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?
                .rows_affected();
            if affected == 0 {
                tracing::debug!(kind = %guard.kind, id = %guard.id, "version guard failed");
                return Err(stale(guard.kind, guard.id));
            }
        }

        insert_all(&mut tx, &batch.inserts.boards).await?;
        insert_all(&mut tx, &batch.inserts.columns).await?;
        insert_all(&mut tx, &batch.inserts.cards).await?;
        update_all(&mut tx, &batch.updates.cards).await?;
        update_all(&mut tx, &batch.updates.columns).await?;
        update_all(&mut tx, &batch.updates.boards).await?;

        tx.commit().await.map_err(db_err)?;
        tracing::debug!(writes = batch.write_count(), "committed batch");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_of_work::{DocumentSet, UnitOfWork, VersionGuard};
    use taskboard_domain::commands::{
        CreateBoard, CreateCard, CreateColumn, DeleteColumn, MoveCard, UpdateColumn,
    };
    use taskboard_domain::{BoardType, CardPlacement, ColumnUpdate, MoveCardRequest};
    use tempfile::tempdir;

    async fn run(store: &SqliteStore, loaded: DocumentSet, command: &dyn taskboard_domain::Command) {
        let mut uow = UnitOfWork::new(loaded);
        uow.execute(command).unwrap();
        store.commit(uow.into_batch().0).await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_and_reload() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteStore::connect(&db_path).await.unwrap();

        let board = CreateBoard::new("Ops".to_string(), None, BoardType::Private);
        run(&store, DocumentSet::default(), &board).await;

        let mut loaded = DocumentSet::default();
        loaded.push_board(store.find_board(board.board_id).await.unwrap());
        let column = CreateColumn::new(board.board_id, "Todo".to_string());
        run(&store, loaded, &column).await;

        let mut loaded = DocumentSet::default();
        loaded.push_board(store.find_board(board.board_id).await.unwrap());
        loaded.push_column(store.find_column(column.column_id).await.unwrap());
        let card = CreateCard::new(board.board_id, column.column_id, "Patch".to_string());
        run(&store, loaded, &card).await;

        // A second handle on the same file sees the committed state.
        assert_eq!(store.path(), db_path.as_path());
        let reopened = SqliteStore::new(store.path());
        let stored = reopened.find_board(board.board_id).await.unwrap().unwrap();
        assert_eq!(stored.column_order_ids, vec![column.column_id]);
        assert_eq!(stored.version, 2);

        let columns = reopened.find_columns_by_board(board.board_id).await.unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].card_order_ids, vec![card.card_id]);

        let cards = reopened.find_cards_by_column(column.column_id).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Patch");
        assert_eq!(reopened.list_boards().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_guard_rolls_back_whole_batch() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::connect(dir.path().join("test.db")).await.unwrap();

        let board = CreateBoard::new("Ops".to_string(), None, BoardType::Public);
        run(&store, DocumentSet::default(), &board).await;
        let stored = store.find_board(board.board_id).await.unwrap().unwrap();

        let mut uow = UnitOfWork::new(DocumentSet {
            boards: vec![stored.clone()],
            ..Default::default()
        });
        let column = CreateColumn::new(board.board_id, "Todo".to_string());
        uow.execute(&column).unwrap();
        let (mut batch, _) = uow.into_batch();
        batch.guards.push(VersionGuard {
            kind: DocumentKind::Board,
            id: board.board_id,
            version: 7,
        });

        let err = store.commit(batch).await.unwrap_err();
        assert!(matches!(err, TaskboardError::Conflict(_)));
        assert!(store.find_column(column.column_id).await.unwrap().is_none());
        let after = store.find_board(board.board_id).await.unwrap().unwrap();
        assert_eq!(after, stored);
    }

    #[tokio::test]
    async fn test_stale_update_is_a_conflict() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::connect(dir.path().join("test.db")).await.unwrap();

        let board = CreateBoard::new("Ops".to_string(), None, BoardType::Public);
        run(&store, DocumentSet::default(), &board).await;
        let stale = store.find_board(board.board_id).await.unwrap().unwrap();

        run(
            &store,
            DocumentSet {
                boards: vec![stale.clone()],
                ..Default::default()
            },
            &CreateColumn::new(board.board_id, "Todo".to_string()),
        )
        .await;

        let mut uow = UnitOfWork::new(DocumentSet {
            boards: vec![stale],
            ..Default::default()
        });
        uow.execute(&CreateColumn::new(board.board_id, "Doing".to_string()))
            .unwrap();
        let err = store.commit(uow.into_batch().0).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.find_columns_by_board(board.board_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_destroyed_rows_are_filtered() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::connect(dir.path().join("test.db")).await.unwrap();

        let board = CreateBoard::new("Ops".to_string(), None, BoardType::Public);
        run(&store, DocumentSet::default(), &board).await;
        let mut loaded = DocumentSet::default();
        loaded.push_board(store.find_board(board.board_id).await.unwrap());
        let column = CreateColumn::new(board.board_id, "Todo".to_string());
        run(&store, loaded, &column).await;

        let mut loaded = DocumentSet::default();
        loaded.push_board(store.find_board(board.board_id).await.unwrap());
        loaded.push_column(store.find_column(column.column_id).await.unwrap());
        run(
            &store,
            loaded,
            &DeleteColumn {
                column_id: column.column_id,
            },
        )
        .await;

        assert!(store.find_column(column.column_id).await.unwrap().is_none());
        let board = store.find_board(board.board_id).await.unwrap().unwrap();
        assert!(board.column_order_ids.is_empty());
    }

    #[tokio::test]
    async fn test_move_rejected_midway_leaves_pre_move_state() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::connect(dir.path().join("test.db")).await.unwrap();

        let board = CreateBoard::new("Ops".to_string(), None, BoardType::Public);
        run(&store, DocumentSet::default(), &board).await;
        let mut column_ids = Vec::new();
        for title in ["Todo", "Done"] {
            let mut loaded = DocumentSet::default();
            loaded.push_board(store.find_board(board.board_id).await.unwrap());
            let column = CreateColumn::new(board.board_id, title.to_string());
            run(&store, loaded, &column).await;
            column_ids.push(column.column_id);
        }
        let (todo, done) = (column_ids[0], column_ids[1]);

        let mut loaded = DocumentSet::default();
        loaded.push_board(store.find_board(board.board_id).await.unwrap());
        loaded.push_column(store.find_column(todo).await.unwrap());
        let card = CreateCard::new(board.board_id, todo, "Patch".to_string());
        run(&store, loaded, &card).await;

        let card_before = store.find_card(card.card_id).await.unwrap().unwrap();
        let todo_before = store.find_column(todo).await.unwrap().unwrap();
        let done_read = store.find_column(done).await.unwrap().unwrap();

        // Plan the move against the current state.
        let mut uow = UnitOfWork::new(DocumentSet {
            columns: vec![todo_before.clone(), done_read.clone()],
            cards: vec![card_before.clone()],
            ..Default::default()
        });
        uow.execute(&MoveCard {
            request: MoveCardRequest {
                card_id: card.card_id,
                source_column_id: todo,
                destination_column_id: done,
                placement: CardPlacement::AtIndex(0),
            },
        })
        .unwrap();
        let (batch, _) = uow.into_batch();
        assert!(batch.guards.is_empty());
        assert_eq!(batch.updates.cards.len(), 1);
        assert_eq!(batch.updates.columns.len(), 2);

        // The destination changes after the move was planned, so the card and
        // source column updates succeed before the destination update fails.
        run(
            &store,
            DocumentSet {
                columns: vec![done_read],
                ..Default::default()
            },
            &UpdateColumn {
                column_id: done,
                updates: ColumnUpdate {
                    title: Some("Shipped".to_string()),
                    card_order_ids: None,
                },
            },
        )
        .await;

        let err = store.commit(batch).await.unwrap_err();
        assert!(matches!(err, TaskboardError::Conflict(_)));

        assert_eq!(store.find_card(card.card_id).await.unwrap().unwrap(), card_before);
        assert_eq!(store.find_column(todo).await.unwrap().unwrap(), todo_before);
        let done_after = store.find_column(done).await.unwrap().unwrap();
        assert!(done_after.card_order_ids.is_empty());
        assert_eq!(done_after.title, "Shipped");
    }
}
