pub mod meta;
pub mod search;
pub mod server;
pub mod updates;

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use serde_json::{json, Value};

use search_node::error::SearchError;

pub type ApiError = (StatusCode, Json<Value>);

/// Map a boundary error to `{error, kind}` with its status / 错误响应
pub fn error_response(err: SearchError) -> ApiError {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut body = json!({
        "error": err.to_string(),
        "kind": err.kind(),
    });
    if let SearchError::RateLimited { retry_after_ms } = err {
        body["retryAfterMs"] = json!(retry_after_ms);
    }
    (status, Json(body))
}

/// Unwrap a JSON body, turning extractor rejections into validation errors / 解析请求体
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(error_response(SearchError::Validation(rejection.body_text())))
        }
    }
}
