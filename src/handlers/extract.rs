//! JSON 请求体提取与校验

use crate::error::AppError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// 与 `Json<T>` 相同，但所有请求体错误都映射为 400，并执行 `validator` 规则
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection_message(&rejection)))?;

        value
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(Self(value))
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "Missing request body".to_string(),
        JsonRejection::JsonSyntaxError(_) => "Malformed request body".to_string(),
        JsonRejection::JsonDataError(e) if e.body_text().contains("unknown field") => {
            "Invalid request body".to_string()
        }
        other => other.body_text(),
    }
}
