use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures_util::StreamExt as _;
use tracing::info;

use crate::{responses, AppState};

/// Push channel: one long-lived connection per browser tab, identified by
/// the `clientId` query parameter. The server only ever pushes; the client
/// sends nothing after connecting. Disconnecting (or being replaced by a
/// reconnect under the same id) deregisters the session.
pub(crate) async fn events_sse(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let client_id = q
        .get("clientId")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());
    let Some(client_id) = client_id else {
        return responses::bad_request("missing clientId parameter");
    };
    info!(client = %client_id, "push channel connected");

    let stream = state.registry().subscribe(client_id).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
        Ok::<_, Infallible>(SseEvent::default().data(data))
    });
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}
