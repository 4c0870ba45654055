use axum::Router;

use crate::state::SharedState;

/// Capture control routes.
pub mod capture;
/// Query, metrics and reset routes.
pub mod coordinator;
/// OpenAPI document route.
pub mod docs;
/// Health check route.
pub mod health;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(coordinator::router())
        .merge(capture::router());

    api_router.merge(docs::router()).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;
    use crate::{
        dao::strategy_api::fake::{Reply, ScriptedTransport},
        services::{
            coordinator::{Coordinator, CoordinatorConfig},
            hand_state::HandStateOverrides,
        },
        state::AppState,
    };

    async fn serve(transport: ScriptedTransport) -> (String, SharedState) {
        let coordinator = Coordinator::new(Arc::new(transport), CoordinatorConfig::default());
        let state = AppState::new(coordinator, HandStateOverrides::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), state)
    }

    fn complete_query() -> Value {
        json!({
            "hand_id": "h_1",
            "table_id": "table_001",
            "street": "preflop",
            "hero_pos": "BTN",
            "effective_stack_bb": 100.0,
            "pot_bb": 1.5,
            "action_line": "FOLD_FOLD_FOLD_FOLD"
        })
    }

    #[tokio::test]
    async fn query_route_returns_envelope_and_updates_metrics() {
        let transport =
            ScriptedTransport::new().then(Duration::ZERO, Reply::strategy("raise_2.5x", "hit"));
        let (base, _state) = serve(transport).await;
        let client = reqwest::Client::new();

        let envelope: Value = client
            .post(format!("{base}/v1/coordinator/query"))
            .json(&complete_query())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(envelope["status"], "SUCCESS");
        assert_eq!(envelope["source"], "network");

        let metrics: Value = client
            .get(format!("{base}/v1/coordinator/metrics"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(metrics["requests"]["total"], 1);
        assert_eq!(metrics["cache"]["hits"], 1);
    }

    #[tokio::test]
    async fn incomplete_query_is_rejected_with_bad_request() {
        let (base, _state) = serve(ScriptedTransport::new()).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/v1/coordinator/query"))
            .json(&json!({"hand_id": "h_1"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert!(body["message"].as_str().unwrap().contains("table_id"));
    }

    #[tokio::test]
    async fn non_object_body_is_rejected_with_message() {
        let (base, _state) = serve(ScriptedTransport::new()).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/v1/coordinator/query"))
            .json(&json!([1, 2, 3]))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert!(body["message"].as_str().unwrap().starts_with("bad request:"));
    }

    #[tokio::test]
    async fn health_degrades_after_failed_query_and_recovers_on_reset() {
        let (base, state) = serve(ScriptedTransport::new()).await;
        let client = reqwest::Client::new();

        state
            .coordinator()
            .query(serde_json::from_value(complete_query()).unwrap())
            .await
            .unwrap();
        let health: Value = client
            .get(format!("{base}/healthcheck"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "degraded");

        let reset = client
            .post(format!("{base}/v1/coordinator/reset"))
            .send()
            .await
            .unwrap();
        assert_eq!(reset.status(), reqwest::StatusCode::NO_CONTENT);

        let health: Value = client
            .get(format!("{base}/healthcheck"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
    }

    #[tokio::test]
    async fn capture_start_twice_conflicts() {
        let (base, _state) = serve(ScriptedTransport::new()).await;
        let client = reqwest::Client::new();

        let first = client
            .post(format!("{base}/v1/capture/start"))
            .send()
            .await
            .unwrap();
        assert_eq!(first.status(), reqwest::StatusCode::NO_CONTENT);
        let second = client
            .post(format!("{base}/v1/capture/start"))
            .send()
            .await
            .unwrap();
        assert_eq!(second.status(), reqwest::StatusCode::CONFLICT);

        let status: Value = client
            .get(format!("{base}/v1/capture/status"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["capturing"], true);
    }

    #[tokio::test]
    async fn openapi_document_lists_coordinator_paths() {
        let (base, _state) = serve(ScriptedTransport::new()).await;

        let doc: Value = reqwest::get(format!("{base}/api-doc/openapi.json"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(doc["paths"]["/v1/coordinator/query"].is_object());
    }
}
