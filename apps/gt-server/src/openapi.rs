use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "grabtube",
        description = "Local web front-end driving an external media-fetching tool"
    ),
    paths(
        crate::api::meta::healthz,
        crate::api::meta::about,
        crate::api::info::info,
        crate::api::download::download_video,
        crate::api::download::download_audio,
        crate::api::download::download_subtitle,
    ),
    components(schemas(
        crate::api::info::InfoRequest,
        gt_protocol::MediaInfo,
        gt_protocol::FormatDescriptor,
        gt_protocol::ErrorBody,
        gt_protocol::ProgressEvent,
        gt_protocol::ProgressKind,
    ))
)]
pub(crate) struct ApiDoc;

pub(crate) async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
