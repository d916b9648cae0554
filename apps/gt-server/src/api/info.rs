use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use gt_core::{metadata, runner};

use crate::{responses, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct InfoRequest {
    pub url: Option<String>,
}

/// Fetch metadata for a pasted URL and list the offerable formats.
#[utoipa::path(
    post,
    path = "/info",
    tag = "Media",
    request_body = InfoRequest,
    responses(
        (status = 200, description = "Media metadata and filtered formats", body = gt_protocol::MediaInfo),
        (status = 400, description = "Invalid URL or metadata fetch failure", body = gt_protocol::ErrorBody)
    )
)]
pub(crate) async fn info(State(state): State<AppState>, Json(req): Json<InfoRequest>) -> Response {
    let url = req.url.as_deref().map(str::trim).unwrap_or_default();
    if url.is_empty() || url::Url::parse(url).is_err() {
        return responses::bad_request("missing or invalid url");
    }

    let bin = runner::resolve_binary(state.tool_override());
    match runner::run_json(&bin, &runner::metadata_args(url)).await {
        Ok(doc) => Json(metadata::media_info(&doc)).into_response(),
        Err(err) => {
            tracing::warn!(%err, "metadata fetch failed");
            responses::bad_request("failed to fetch media details")
        }
    }
}
