//! In-process HTTP stand-in for the Free Dictionary API
//!
//! Word-driven responses:
//! - `hello`: full entry
//! - `empty`: 200 with `[]`
//! - `broken`: 500
//! - `garbled`: 200 with a body that is not JSON
//! - anything else: 404 "No Definitions Found"

use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

async fn entry(Path(word): Path<String>) -> Response {
    match word.as_str() {
        "hello" => Json(json!([{
            "word": "hello",
            "phonetic": "həˈləʊ",
            "phonetics": [{"text": "həˈləʊ", "audio": ""}],
            "meanings": [{
                "partOfSpeech": "exclamation",
                "definitions": [{"definition": "used as a greeting or to begin a phone conversation"}]
            }]
        }]))
        .into_response(),
        "empty" => Json(json!([])).into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        "garbled" => (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "title": "No Definitions Found",
                "message": "Sorry pal, we couldn't find definitions for the word you were looking for.",
                "resolution": "You can try the search again at later time or head to the web instead."
            })),
        )
            .into_response(),
    }
}

/// Serve the mock on an ephemeral port; returns its base URL
pub async fn spawn_mock_dictionary() -> String {
    let app = Router::new().route("/api/v2/entries/en/:word", get(entry));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock dictionary");
    let addr = listener.local_addr().expect("mock dictionary address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock dictionary server");
    });

    format!("http://{}", addr)
}
