use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
};
use mockall::mock;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use taskboard_core::{ObjectId, TaskboardError, TaskboardResult};
use taskboard_domain::{Board, BoardType, Card, Column};
use taskboard_persistence::{DocumentStore, RetryPolicy, WriteBatch};
use taskboard_server::{router, AppState};
use tower::ServiceExt;

mock! {
    pub Store {}

    #[async_trait]
    impl DocumentStore for Store {
        async fn find_board(&self, id: ObjectId) -> TaskboardResult<Option<Board>>;
        async fn find_column(&self, id: ObjectId) -> TaskboardResult<Option<Column>>;
        async fn find_card(&self, id: ObjectId) -> TaskboardResult<Option<Card>>;
        async fn list_boards(&self) -> TaskboardResult<Vec<Board>>;
        async fn find_columns_by_board(&self, board_id: ObjectId) -> TaskboardResult<Vec<Column>>;
        async fn find_cards_by_board(&self, board_id: ObjectId) -> TaskboardResult<Vec<Card>>;
        async fn find_cards_by_column(&self, column_id: ObjectId) -> TaskboardResult<Vec<Card>>;
        async fn commit(&self, batch: WriteBatch) -> TaskboardResult<()>;
        fn backend_name(&self) -> &'static str;
    }
}

fn stored_board() -> Board {
    let mut board = Board::new("Roadmap".to_string(), None, BoardType::Public);
    board.version = 1;
    board
}

async fn create_column(store: MockStore, board_id: ObjectId) -> (StatusCode, Value) {
    let app = router(AppState::with_store(
        Arc::new(store),
        RetryPolicy::new(3, Duration::from_millis(1)),
    ));
    let request = Request::builder()
        .method("POST")
        .uri("/columns")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"boardId": board_id.to_string(), "title": "Todo"}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_storage_failure_is_a_generic_500() {
    let board = stored_board();
    let board_id = board.id;

    let mut store = MockStore::new();
    store
        .expect_find_board()
        .returning(move |_| Ok(Some(board.clone())));
    store
        .expect_commit()
        .times(1)
        .returning(|_| Err(TaskboardError::Database("disk I/O error at /var/lib/taskboard".into())));
    store.expect_backend_name().return_const("mock");

    let (status, body) = create_column(store, board_id).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["statusCode"], 500);
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn test_conflicts_are_retried_then_reported() {
    let board = stored_board();
    let board_id = board.id;

    let mut store = MockStore::new();
    store
        .expect_find_board()
        .times(3)
        .returning(move |_| Ok(Some(board.clone())));
    store
        .expect_commit()
        .times(3)
        .returning(|_| Err(TaskboardError::Conflict("board moved on".into())));
    store.expect_backend_name().return_const("mock");

    let (status, body) = create_column(store, board_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["statusCode"], 409);
}

#[tokio::test]
async fn test_commit_carries_guarded_board_and_new_column() {
    let board = stored_board();
    let board_id = board.id;

    let mut store = MockStore::new();
    store
        .expect_find_board()
        .returning(move |_| Ok(Some(board.clone())));
    store
        .expect_commit()
        .withf(move |batch: &WriteBatch| {
            batch.inserts.columns.len() == 1
                && batch.inserts.columns[0].version == 1
                && batch.updates.boards.len() == 1
                && batch.updates.boards[0].id == board_id
                && batch.updates.boards[0].version == 2
        })
        .times(1)
        .returning(|_| Ok(()));
    store.expect_backend_name().return_const("mock");

    let (status, body) = create_column(store, board_id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["boardId"], json!(board_id.to_string()));
    assert_eq!(body["version"], 1);
}
