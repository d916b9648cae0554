use axum::{
    routing::{get, post},
    Router,
};

use crate::{api, openapi, AppState};

pub(crate) mod paths {
    pub const ROOT: &str = "/";
    pub const HEALTHZ: &str = "/healthz";
    pub const ABOUT: &str = "/about";
    pub const OPENAPI_JSON: &str = "/spec/openapi.json";
    pub const INFO: &str = "/info";
    pub const DOWNLOAD: &str = "/download";
    pub const DOWNLOAD_AUDIO: &str = "/download-audio";
    pub const DOWNLOAD_SUBTITLE: &str = "/download-subtitle";
    pub const EVENTS: &str = "/events";
}

/// Every endpoint the server exposes, for the `/about` index.
pub(crate) const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", paths::ROOT),
    ("GET", paths::HEALTHZ),
    ("GET", paths::ABOUT),
    ("GET", paths::OPENAPI_JSON),
    ("POST", paths::INFO),
    ("GET", paths::DOWNLOAD),
    ("GET", paths::DOWNLOAD_AUDIO),
    ("GET", paths::DOWNLOAD_SUBTITLE),
    ("GET", paths::EVENTS),
];

pub(crate) fn build_router() -> Router<AppState> {
    Router::new()
        .route(paths::ROOT, get(api::ui::index))
        .route(paths::HEALTHZ, get(api::meta::healthz))
        .route(paths::ABOUT, get(api::meta::about))
        .route(paths::OPENAPI_JSON, get(openapi::openapi_json))
        .route(paths::INFO, post(api::info::info))
        .route(paths::DOWNLOAD, get(api::download::download_video))
        .route(paths::DOWNLOAD_AUDIO, get(api::download::download_audio))
        .route(
            paths::DOWNLOAD_SUBTITLE,
            get(api::download::download_subtitle),
        )
        .route(paths::EVENTS, get(api::events::events_sse))
}
