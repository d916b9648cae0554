use axum::response::Html;

/// Landing page. The page is a thin client over the JSON API and the push
/// channel; everything interesting happens server-side.
pub(crate) async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}
