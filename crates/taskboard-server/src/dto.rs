//! Request bodies and their validation.
//!
//! Every body is checked here and converted into domain values, so the
//! operations behind the routes only ever see well-formed input.

use serde::{Deserialize, Deserializer, Serialize};
use taskboard_core::{ObjectId, TaskboardError, TaskboardResult};
use taskboard_domain::{
    BoardType, BoardUpdate, CardPlacement, CardUpdate, ColumnUpdate, FieldUpdate,
    MoveCardRequest, NewCard,
};

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 50;
const DESCRIPTION_MIN: usize = 3;
const DESCRIPTION_MAX: usize = 256;

/// Keeps an explicit `null` apart from an absent key.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn bounded(field: &str, value: String, min: usize, max: usize) -> TaskboardResult<String> {
    let trimmed = value.trim();
    let length = trimmed.chars().count();
    if length < min || length > max {
        return Err(TaskboardError::Validation(format!(
            "\"{}\" length must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(trimmed.to_string())
}

pub fn title(value: String) -> TaskboardResult<String> {
    bounded("title", value, TITLE_MIN, TITLE_MAX)
}

pub fn description(value: String) -> TaskboardResult<String> {
    bounded("description", value, DESCRIPTION_MIN, DESCRIPTION_MAX)
}

fn parse_ids(field: &str, values: Vec<String>) -> TaskboardResult<Vec<ObjectId>> {
    values
        .iter()
        .map(|value| ObjectId::parse_field(field, value))
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub board_type: String,
}

impl CreateBoardRequest {
    pub fn validate(self) -> TaskboardResult<(String, Option<String>, BoardType)> {
        Ok((
            title(self.title)?,
            self.description.map(description).transpose()?,
            self.board_type.parse()?,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, rename = "type")]
    pub board_type: Option<String>,
    #[serde(default)]
    pub column_order_ids: Option<Vec<String>>,
}

impl UpdateBoardRequest {
    pub fn validate(self) -> TaskboardResult<BoardUpdate> {
        Ok(BoardUpdate {
            title: self.title.map(title).transpose()?,
            description: FieldUpdate::from(self.description).try_map(description)?,
            board_type: self.board_type.map(|t| t.parse()).transpose()?,
            column_order_ids: self
                .column_order_ids
                .map(|ids| parse_ids("columnOrderIds", ids))
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumnRequest {
    pub board_id: String,
    pub title: String,
}

impl CreateColumnRequest {
    pub fn validate(self) -> TaskboardResult<(ObjectId, String)> {
        Ok((
            ObjectId::parse_field("boardId", &self.board_id)?,
            title(self.title)?,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateColumnRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub card_order_ids: Option<Vec<String>>,
}

impl UpdateColumnRequest {
    pub fn validate(self) -> TaskboardResult<ColumnUpdate> {
        Ok(ColumnUpdate {
            title: self.title.map(title).transpose()?,
            card_order_ids: self
                .card_order_ids
                .map(|ids| parse_ids("cardOrderIds", ids))
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub board_id: String,
    pub column_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateCardRequest {
    pub fn validate(self) -> TaskboardResult<NewCard> {
        Ok(NewCard {
            board_id: ObjectId::parse_field("boardId", &self.board_id)?,
            column_id: ObjectId::parse_field("columnId", &self.column_id)?,
            title: title(self.title)?,
            description: self.description.map(description).transpose()?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover: Option<Option<String>>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

impl UpdateCardRequest {
    pub fn validate(self) -> TaskboardResult<CardUpdate> {
        Ok(CardUpdate {
            title: self.title.map(title).transpose()?,
            description: FieldUpdate::from(self.description).try_map(description)?,
            cover: FieldUpdate::from(self.cover),
            labels: self.labels,
        })
    }
}

/// Body of a drag-and-drop move. `prev*` is the column the card leaves,
/// `next*` the one it lands in; they are equal for an in-column reorder.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardBody {
    pub card_id: String,
    pub prev_column_id: String,
    #[serde(default)]
    pub prev_card_order_ids: Option<Vec<String>>,
    pub next_column_id: String,
    #[serde(default)]
    pub next_card_order_ids: Option<Vec<String>>,
    #[serde(default)]
    pub destination_index: Option<usize>,
}

impl MoveCardBody {
    pub fn validate(self) -> TaskboardResult<MoveCardRequest> {
        let card_id = ObjectId::parse_field("cardId", &self.card_id)?;
        let source_column_id = ObjectId::parse_field("prevColumnId", &self.prev_column_id)?;
        let destination_column_id = ObjectId::parse_field("nextColumnId", &self.next_column_id)?;
        let in_column = source_column_id == destination_column_id;

        let source_order = self
            .prev_card_order_ids
            .map(|ids| parse_ids("prevCardOrderIds", ids))
            .transpose()?;
        let destination_order = self
            .next_card_order_ids
            .map(|ids| parse_ids("nextCardOrderIds", ids))
            .transpose()?;

        let placement = match (source_order, destination_order, self.destination_index) {
            (Some(source_order), destination_order, _) if in_column => CardPlacement::Explicit {
                source_order,
                destination_order: destination_order.unwrap_or_default(),
            },
            (Some(source_order), Some(destination_order), _) => CardPlacement::Explicit {
                source_order,
                destination_order,
            },
            (_, _, Some(index)) => CardPlacement::AtIndex(index),
            _ if in_column => {
                return Err(TaskboardError::Validation(
                    "\"prevCardOrderIds\" or \"destinationIndex\" is required".to_string(),
                ))
            }
            _ => {
                return Err(TaskboardError::Validation(
                    "\"prevCardOrderIds\" and \"nextCardOrderIds\", or \"destinationIndex\", are required"
                        .to_string(),
                ))
            }
        };

        Ok(MoveCardRequest {
            card_id,
            source_column_id,
            destination_column_id,
            placement,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub delete_result: String,
}

impl DeleteResult {
    pub fn new(message: &str) -> Self {
        Self {
            delete_result: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id() -> String {
        ObjectId::new().to_string()
    }

    #[test]
    fn test_titles_are_trimmed_and_bounded() {
        assert_eq!(title("  Backlog  ".to_string()).unwrap(), "Backlog");
        assert!(title("ab".to_string()).is_err());
        assert!(title("   ab   ".to_string()).is_err());
        assert!(title("x".repeat(51)).is_err());
        assert!(title("x".repeat(50)).is_ok());
    }

    #[test]
    fn test_update_board_distinguishes_null_from_absent() {
        let absent: UpdateBoardRequest = serde_json::from_value(json!({"title": "Roadmap"})).unwrap();
        assert_eq!(absent.validate().unwrap().description, FieldUpdate::NoChange);

        let cleared: UpdateBoardRequest =
            serde_json::from_value(json!({"description": null})).unwrap();
        assert_eq!(cleared.validate().unwrap().description, FieldUpdate::Clear);
    }

    #[test]
    fn test_create_board_rejects_unknown_type() {
        let request: CreateBoardRequest =
            serde_json::from_value(json!({"title": "Roadmap", "type": "secret"})).unwrap();
        assert!(matches!(
            request.validate(),
            Err(TaskboardError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_ids_are_validation_errors() {
        let request: CreateColumnRequest =
            serde_json::from_value(json!({"boardId": "not-an-id", "title": "Todo"})).unwrap();
        assert!(matches!(
            request.validate(),
            Err(TaskboardError::Validation(_))
        ));
    }

    #[test]
    fn test_move_with_both_arrays_is_explicit() {
        let (card, a, b) = (id(), id(), id());
        let body: MoveCardBody = serde_json::from_value(json!({
            "cardId": card,
            "prevColumnId": a,
            "prevCardOrderIds": [],
            "nextColumnId": b,
            "nextCardOrderIds": [card],
        }))
        .unwrap();
        let request = body.validate().unwrap();
        assert!(matches!(request.placement, CardPlacement::Explicit { .. }));
        assert!(!request.is_in_column());
    }

    #[test]
    fn test_move_with_index_only() {
        let (card, a, b) = (id(), id(), id());
        let body: MoveCardBody = serde_json::from_value(json!({
            "cardId": card,
            "prevColumnId": a,
            "nextColumnId": b,
            "destinationIndex": 2,
        }))
        .unwrap();
        assert_eq!(body.validate().unwrap().placement, CardPlacement::AtIndex(2));
    }

    #[test]
    fn test_move_cross_column_needs_both_arrays_or_index() {
        let (card, a, b) = (id(), id(), id());
        let body: MoveCardBody = serde_json::from_value(json!({
            "cardId": card,
            "prevColumnId": a,
            "prevCardOrderIds": [],
            "nextColumnId": b,
        }))
        .unwrap();
        assert!(matches!(body.validate(), Err(TaskboardError::Validation(_))));
    }

    #[test]
    fn test_in_column_reorder_needs_only_source_array() {
        let (card, a) = (id(), id());
        let body: MoveCardBody = serde_json::from_value(json!({
            "cardId": card,
            "prevColumnId": a,
            "prevCardOrderIds": [card],
            "nextColumnId": a,
        }))
        .unwrap();
        let request = body.validate().unwrap();
        assert!(request.is_in_column());
        assert!(matches!(
            request.placement,
            CardPlacement::Explicit { ref destination_order, .. } if destination_order.is_empty()
        ));
    }
}
