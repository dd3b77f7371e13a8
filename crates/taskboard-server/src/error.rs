use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use taskboard_core::TaskboardError;

/// HTTP face of a [`TaskboardError`].
#[derive(Debug)]
pub struct AppError(pub TaskboardError);

impl From<TaskboardError> for AppError {
    fn from(error: TaskboardError) -> Self {
        Self(error)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            TaskboardError::Validation(_) | TaskboardError::Consistency(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TaskboardError::NotFound(_) => StatusCode::NOT_FOUND,
            TaskboardError::Conflict(_) => StatusCode::CONFLICT,
            TaskboardError::Database(_)
            | TaskboardError::Io(_)
            | TaskboardError::Serialization(_)
            | TaskboardError::Config(_)
            | TaskboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(json!({
                "statusCode": status.as_u16(),
                "message": message,
            })),
        )
            .into_response()
    }
}

/// `Json` extractor whose rejections use the 422 error body.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError(TaskboardError::Validation(rejection.body_text()))),
        }
    }
}
