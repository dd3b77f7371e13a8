use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use taskboard_core::ObjectId;
use taskboard_domain::{Board, BoardView, Card, Column, ColumnView, MoveCardOutcome};

use crate::dto::{
    CreateBoardRequest, CreateCardRequest, CreateColumnRequest, DeleteResult, MoveCardBody,
    UpdateBoardRequest, UpdateCardRequest, UpdateColumnRequest,
};
use crate::error::{AppError, ValidatedJson};
use crate::state::AppState;

type ApiResult<T> = Result<T, AppError>;

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// Boards

pub async fn create_board_handler(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    let (title, description, board_type) = body.validate()?;
    let board = state
        .operations
        .create_board(title, description, board_type)
        .await?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn list_boards_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<Board>>> {
    Ok(Json(state.operations.list_boards().await?))
}

pub async fn get_board_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BoardView>> {
    let id = ObjectId::parse_field("id", &id)?;
    Ok(Json(state.operations.get_board(id).await?))
}

pub async fn update_board_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateBoardRequest>,
) -> ApiResult<Json<Board>> {
    let id = ObjectId::parse_field("id", &id)?;
    let updates = body.validate()?;
    Ok(Json(state.operations.update_board(id, updates).await?))
}

pub async fn move_card_handler(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<MoveCardBody>,
) -> ApiResult<Json<MoveCardOutcome>> {
    let request = body.validate()?;
    Ok(Json(state.operations.move_card(request).await?))
}

// Columns

pub async fn create_column_handler(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateColumnRequest>,
) -> ApiResult<(StatusCode, Json<ColumnView>)> {
    let (board_id, title) = body.validate()?;
    let column = state.operations.create_column(board_id, title).await?;
    Ok((StatusCode::CREATED, Json(column)))
}

pub async fn update_column_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateColumnRequest>,
) -> ApiResult<Json<Column>> {
    let id = ObjectId::parse_field("id", &id)?;
    let updates = body.validate()?;
    Ok(Json(state.operations.update_column(id, updates).await?))
}

pub async fn delete_column_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResult>> {
    let id = ObjectId::parse_field("id", &id)?;
    state.operations.delete_column(id).await?;
    Ok(Json(DeleteResult::new(
        "Column and its Cards deleted successfully!",
    )))
}

// Cards

pub async fn create_card_handler(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateCardRequest>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    let card = state.operations.create_card(body.validate()?).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn get_card_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Card>> {
    let id = ObjectId::parse_field("id", &id)?;
    Ok(Json(state.operations.get_card(id).await?))
}

pub async fn update_card_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateCardRequest>,
) -> ApiResult<Json<Card>> {
    let id = ObjectId::parse_field("id", &id)?;
    let updates = body.validate()?;
    Ok(Json(state.operations.update_card(id, updates).await?))
}

pub async fn delete_card_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResult>> {
    let id = ObjectId::parse_field("id", &id)?;
    state.operations.delete_card(id).await?;
    Ok(Json(DeleteResult::new("Card deleted successfully!")))
}
