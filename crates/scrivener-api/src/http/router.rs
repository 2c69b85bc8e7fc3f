//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS and request tracing.
//! Process health checks are the deployment platform's concern and have
//! no route here.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/clients/{id}/messages",
            post(handlers::dialog::post_message),
        )
        .route("/clients/{id}/choices", post(handlers::dialog::post_choice))
        .route("/clients/{id}/cancel", post(handlers::dialog::post_cancel))
        .route(
            "/clients/{id}/queue-position",
            get(handlers::queue::get_queue_position),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use secrecy::SecretString;
    use serde_json::json;

    use scrivener_types::config::ServiceConfig;

    /// Serve the router on an ephemeral port with collaborators pointed at
    /// an unroutable endpoint (connection refused, so question generation
    /// exercises its fallback path).
    async fn serve() -> String {
        let mut config = ServiceConfig::default();
        config.generator.base_url = "http://127.0.0.1:1".to_string();
        config.notifier.base_url = "http://127.0.0.1:1".to_string();

        let state = AppState::init(&config, SecretString::from("test-key"), None);
        let router = build_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api/v1")
    }

    #[tokio::test]
    async fn test_dialog_over_http() {
        let base = serve().await;
        let client = reqwest::Client::new();

        // Topic creates a session and offers languages.
        let body: serde_json::Value = client
            .post(format!("{base}/clients/c-1/messages"))
            .json(&json!({"text": "Solar power"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(body["data"]["text"]
            .as_str()
            .unwrap()
            .contains("Which language"));
        assert_eq!(body["data"]["options"][0]["state"], "choosing_language");

        // Choosing a language reaches the (unreachable) question service
        // and falls back to the depth step.
        let body: serde_json::Value = client
            .post(format!("{base}/clients/c-1/choices"))
            .json(&json!({"choice_id": "english", "expected_state": "choosing_language"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["data"]["options"][0]["state"], "choosing_depth");

        // A stale button from the language keyboard is refused.
        let body: serde_json::Value = client
            .post(format!("{base}/clients/c-1/choices"))
            .json(&json!({"choice_id": "arabic", "expected_state": "choosing_language"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(body["data"]["text"]
            .as_str()
            .unwrap()
            .contains("no longer applies"));

        // Not waiting in the queue: position is null.
        let body: serde_json::Value = client
            .get(format!("{base}/clients/c-1/queue-position"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(body["data"]["position"].is_null());
        assert_eq!(body["data"]["queue_length"], 0);

        // Cancellation tears the session down.
        let body: serde_json::Value = client
            .post(format!("{base}/clients/c-1/cancel"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(body["data"]["text"].as_str().unwrap().contains("cancelled"));
    }

    #[tokio::test]
    async fn test_empty_choice_id_is_rejected() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/clients/c-2/choices"))
            .json(&json!({"choice_id": "", "expected_state": "choosing_depth"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }
}
