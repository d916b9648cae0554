use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
};
use futures_util::StreamExt as _;
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use gt_protocol::{DownloadKind, ProgressEvent};

use crate::{
    download::{self, Artifact, CleanupGuard},
    responses, AppState,
};

#[derive(Debug, Deserialize)]
pub(crate) struct DownloadQuery {
    pub url: Option<String>,
    pub quality: Option<String>,
    #[serde(rename = "clientId")]
    pub client_id: Option<String>,
}

/// Download the merged video track as an mp4 attachment.
#[utoipa::path(
    get,
    path = "/download",
    tag = "Download",
    responses(
        (status = 200, description = "mp4 attachment stream"),
        (status = 400, description = "Bad input or metadata failure", body = gt_protocol::ErrorBody),
        (status = 500, description = "Extraction failure", body = gt_protocol::ErrorBody)
    )
)]
pub(crate) async fn download_video(
    State(state): State<AppState>,
    Query(q): Query<DownloadQuery>,
) -> Response {
    serve(state, DownloadKind::Video, q).await
}

/// Extract and transcode the audio track to mp3.
#[utoipa::path(
    get,
    path = "/download-audio",
    tag = "Download",
    responses(
        (status = 200, description = "mp3 attachment stream"),
        (status = 400, description = "Bad input or metadata failure", body = gt_protocol::ErrorBody),
        (status = 500, description = "Extraction failure", body = gt_protocol::ErrorBody)
    )
)]
pub(crate) async fn download_audio(
    State(state): State<AppState>,
    Query(q): Query<DownloadQuery>,
) -> Response {
    serve(state, DownloadKind::Audio, q).await
}

/// Fetch English subtitles converted to srt.
#[utoipa::path(
    get,
    path = "/download-subtitle",
    tag = "Download",
    responses(
        (status = 200, description = "srt attachment stream"),
        (status = 400, description = "Bad input, metadata failure, or no subtitles", body = gt_protocol::ErrorBody),
        (status = 500, description = "Extraction failure", body = gt_protocol::ErrorBody)
    )
)]
pub(crate) async fn download_subtitle(
    State(state): State<AppState>,
    Query(q): Query<DownloadQuery>,
) -> Response {
    serve(state, DownloadKind::Subtitle, q).await
}

async fn serve(state: AppState, kind: DownloadKind, q: DownloadQuery) -> Response {
    let url = q.url.as_deref().unwrap_or_default();
    match download::run(
        &state,
        kind,
        url,
        q.quality.as_deref(),
        q.client_id.as_deref(),
    )
    .await
    {
        Ok(artifact) => stream_artifact(artifact).await,
        Err(err) => {
            tracing::error!(%err, kind = ?kind, "download request failed");
            if let Some(id) = q.client_id.as_deref() {
                state
                    .registry()
                    .send(id, ProgressEvent::error(err.to_string()));
            }
            responses::json_error(err.status(), err.to_string())
        }
    }
}

async fn stream_artifact(artifact: Artifact) -> Response {
    let file = match tokio::fs::File::open(&artifact.path).await {
        Ok(file) => file,
        Err(err) => {
            tracing::error!(path = %artifact.path.display(), %err, "failed to open produced artifact");
            drop(CleanupGuard::new(artifact.cleanup));
            return responses::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to open the produced file",
            );
        }
    };

    // The guard rides inside the body stream: cleanup fires when the
    // response is dropped, whether the transfer completed or the client
    // went away halfway.
    let guard = CleanupGuard::new(artifact.cleanup);
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _ = &guard;
        chunk
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, artifact.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                urlencoding::encode(&artifact.file_name)
            ),
        )
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
