use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gt_protocol::ErrorBody;

/// JSON `{"error": ...}` body with the given status. Every failing route
/// goes through here; internal detail stays in the logs.
pub(crate) fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

pub(crate) fn bad_request(message: impl Into<String>) -> Response {
    json_error(StatusCode::BAD_REQUEST, message)
}
