//! HTTP serving layer.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /` | Rendered front page (HTML) |
//! | `GET /api/news` | The current snapshot as JSON |
//! | `GET /health` | Liveness plus refresh stamp and story count |
//!
//! Handlers only read the published snapshot; they never trigger a fetch.

use crate::models::Snapshot;
use crate::outputs::html::render_front_page;
use crate::snapshot::SnapshotStore;
use axum::extract::State;
use axum::response::{Html, Json};
use axum::routing::get;
use axum::Router;
use serde_json::{Value, json};
use std::error::Error;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(front_page))
        .route("/api/news", get(news))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process exits.
#[instrument(level = "info", skip_all, fields(%addr))]
pub async fn serve(addr: &str, state: AppState) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn front_page(State(state): State<AppState>) -> Html<String> {
    Html(render_front_page(&state.store.current()))
}

async fn news(State(state): State<AppState>) -> Json<Snapshot> {
    Json(Snapshot::clone(&state.store.current()))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.store.current();
    Json(json!({
        "status": "ok",
        "refreshed_at": snapshot.refreshed_label(),
        "stories": snapshot.stories.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PublishedStory;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use chrono::{FixedOffset, TimeZone};
    use tower::ServiceExt;

    fn state_with_story() -> AppState {
        let ist = FixedOffset::east_opt(19800).unwrap();
        let at = ist.with_ymd_and_hms(2025, 5, 10, 14, 0, 0).unwrap();
        let story = PublishedStory {
            headline: "Ceasefire holds overnight".to_string(),
            summary: "No violations were reported.".to_string(),
            headlines: vec!["Ceasefire holds overnight".to_string()],
            sources: ["NDTV"].into_iter().map(String::from).collect(),
            urls: ["https://ndtv.com/ceasefire"].into_iter().map(String::from).collect(),
            time: "2025-05-10 14:00:00".to_string(),
            latest_time: at,
        };
        AppState {
            store: Arc::new(SnapshotStore::with_snapshot(Snapshot {
                refreshed_at: at,
                stories: vec![story],
            })),
        }
    }

    async fn get_body(path: &str) -> (StatusCode, String) {
        let response = router(state_with_story())
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_front_page() {
        let (status, body) = get_body("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Ceasefire holds overnight"));
        assert!(body.contains("Last updated: 2025-05-10 14:00:00"));
    }

    #[tokio::test]
    async fn test_api_news() {
        let (status, body) = get_body("/api/news").await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["stories"][0]["headline"], "Ceasefire holds overnight");
        assert_eq!(value["stories"][0]["sources"], json!(["NDTV"]));
        assert_eq!(value["stories"][0]["time"], "2025-05-10 14:00:00");
    }

    #[tokio::test]
    async fn test_health_and_unknown_route() {
        let (status, body) = get_body("/health").await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["stories"], 1);

        let (status, _) = get_body("/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
