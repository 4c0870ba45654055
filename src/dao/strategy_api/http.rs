use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;

use crate::dto::query::Query;

use super::{
    RawResponse, StrategyTransport,
    config::StrategyApiConfig,
    error::{TransportError, TransportResult},
};

/// `reqwest`-backed transport posting queries as JSON.
#[derive(Clone)]
pub struct HttpStrategyClient {
    client: Client,
    query_url: Arc<str>,
}

impl HttpStrategyClient {
    /// Build the underlying HTTP client for the configured service.
    pub fn new(config: StrategyApiConfig) -> TransportResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| TransportError::ClientBuilder { source })?;

        Ok(Self {
            client,
            query_url: Arc::<str>::from(config.query_url()),
        })
    }

    /// Endpoint every query is posted to.
    pub fn query_url(&self) -> &str {
        &self.query_url
    }
}

impl StrategyTransport for HttpStrategyClient {
    fn post_query(&self, query: Query) -> BoxFuture<'static, TransportResult<RawResponse>> {
        let client = self.client.clone();
        let url = self.query_url.clone();
        Box::pin(async move {
            let response = client
                .post(url.as_ref())
                .json(&query)
                .send()
                .await
                .map_err(TransportError::from_reqwest)?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(TransportError::from_reqwest)?;

            Ok(RawResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;
    use crate::dao::strategy_api::config::QUERY_PATH;

    async fn spawn_stub(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn posts_query_as_json_body() {
        let router = Router::new().route(
            QUERY_PATH,
            post(|Json(body): Json<Value>| async move {
                Json(json!({"success": true, "data": {"echo": body}}))
            }),
        );
        let base_url = spawn_stub(router).await;
        let client = HttpStrategyClient::new(StrategyApiConfig::new(base_url)).unwrap();

        let query = Query::new().with("hand_id", "h_1").with("pot_bb", 1.5);
        let response = client.post_query(query).await.unwrap();

        assert_eq!(response.status, 200);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["data"]["echo"], json!({"hand_id": "h_1", "pot_bb": 1.5}));
    }

    #[tokio::test]
    async fn non_success_status_is_returned_not_raised() {
        let router = Router::new().route(
            QUERY_PATH,
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base_url = spawn_stub(router).await;
        let client = HttpStrategyClient::new(StrategyApiConfig::new(base_url)).unwrap();

        let response = client.post_query(Query::new()).await.unwrap();
        assert_eq!(response, RawResponse::new(503, "down"));
    }

    #[tokio::test]
    async fn refused_connection_maps_to_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpStrategyClient::new(StrategyApiConfig::new(format!("http://{addr}"))).unwrap();
        let err = client.post_query(Query::new()).await.unwrap_err();
        assert!(matches!(err, TransportError::Network { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn connect_timeout_maps_to_network_error() {
        // Non-routable address: the connect attempt hangs until the connect timeout.
        let config = StrategyApiConfig::new("http://10.255.255.1:81")
            .with_connect_timeout(Duration::from_millis(100));
        let client = HttpStrategyClient::new(config).unwrap();

        let err = client.post_query(Query::new()).await.unwrap_err();
        assert!(matches!(err, TransportError::Network { .. }), "got {err:?}");
    }
}
