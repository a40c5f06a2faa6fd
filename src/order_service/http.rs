use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{OrderReader, OrderStatusUpdater, RemoteError};
use crate::config::OrderServiceConfig;
use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::utils::retry_on_transient;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Serialize)]
struct StatusUpdateBody {
    status: OrderStatus,
}

/// Some deployments wrap resources in `{ "data": ... }`.
#[derive(Deserialize)]
struct Wrapped {
    data: Order,
}

/// HTTP client for the REST order service.
#[derive(Debug, Clone)]
pub struct HttpOrderService {
    http: reqwest::Client,
    config: OrderServiceConfig,
}

impl HttpOrderService {
    pub fn new(config: OrderServiceConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(RemoteError::Transport)?;

        Ok(Self { http, config })
    }

    fn order_url(&self, order_id: OrderId) -> String {
        format!("{}/orders/{}", self.config.base_url(), order_id)
    }

    fn status_url(&self, order_id: OrderId) -> String {
        format!("{}/status", self.order_url(order_id))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_for_order(
        &self,
        request: RequestBuilder,
        request_id: Uuid,
    ) -> Result<Order, RemoteError> {
        let response = self
            .authorize(request)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await
            .map_err(RemoteError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(RemoteError::Transport)?;

        if !status.is_success() {
            return Err(RemoteError::Http {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        decode_order(&body)
    }

    async fn fetch_once(&self, order_id: OrderId) -> Result<Order, RemoteError> {
        let request_id = Uuid::new_v4();

        tracing::debug!(order_id = %order_id, request_id = %request_id, "Fetching order");

        self.send_for_order(self.http.get(self.order_url(order_id)), request_id)
            .await
    }
}

#[async_trait]
impl OrderReader for HttpOrderService {
    async fn fetch_order(&self, order_id: OrderId) -> Result<Order, RemoteError> {
        retry_on_transient(&self.config.read_retry, move |_attempt| self.fetch_once(order_id))
            .await
            .into_result()
    }
}

#[async_trait]
impl OrderStatusUpdater for HttpOrderService {
    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RemoteError> {
        let request_id = Uuid::new_v4();

        tracing::debug!(
            order_id = %order_id,
            status = %status,
            request_id = %request_id,
            "Sending order status update"
        );

        let request = self
            .http
            .patch(self.status_url(order_id))
            .json(&StatusUpdateBody { status });

        self.send_for_order(request, request_id).await
    }
}

/// Decode a bare order, falling back to the `{ "data": ... }` envelope.
/// The bare attempt's error is the one reported.
fn decode_order(body: &str) -> Result<Order, RemoteError> {
    match serde_json::from_str::<Order>(body) {
        Ok(order) => Ok(order),
        Err(bare_err) => serde_json::from_str::<Wrapped>(body)
            .map(|wrapped| wrapped.data)
            .map_err(|_| RemoteError::Decode(bare_err.to_string())),
    }
}

/// Prefer the service's own `message`, then the raw body, then the reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));

    if let Some(message) = from_json {
        return message;
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::RetryConfig;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;
    use serde_json::json;
    use std::time::Duration;

    fn service(base_url: &str) -> HttpOrderService {
        HttpOrderService::new(OrderServiceConfig::new(base_url)).unwrap()
    }

    #[test]
    fn test_urls() {
        let svc = service("http://localhost:8080/api/");
        assert_eq!(svc.order_url(OrderId(42)), "http://localhost:8080/api/orders/42");
        assert_eq!(
            svc.status_url(OrderId(42)),
            "http://localhost:8080/api/orders/42/status"
        );
    }

    #[test]
    fn test_status_update_body() {
        let body = serde_json::to_string(&StatusUpdateBody {
            status: OrderStatus::Cancelled,
        })
        .unwrap();
        assert_eq!(body, r#"{"status":"CANCELLED"}"#);
    }

    #[test]
    fn test_decode_bare_and_wrapped_orders() {
        let bare = r#"{"id": 42, "status": "CONFIRMED", "totalPrice": 10.5}"#;
        let wrapped = r#"{"data": {"id": 42, "status": "CONFIRMED", "totalPrice": 10.5}}"#;

        let a = decode_order(bare).unwrap();
        let b = decode_order(wrapped).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_decode_rejects_unknown_status() {
        let err = decode_order(r#"{"id": 1, "status": "SHIPPED", "totalPrice": 0}"#).unwrap_err();
        match err {
            RemoteError::Decode(message) => {
                assert!(message.contains("SHIPPED"), "{message}");
                assert!(message.contains("unknown variant"), "{message}");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        let msg = error_message(
            StatusCode::CONFLICT,
            r#"{"status": 409, "message": "Order already completed"}"#,
        );
        assert_eq!(msg, "Order already completed");
    }

    #[test]
    fn test_error_message_falls_back_to_body_then_reason() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, " upstream down \n"),
            "upstream down"
        );
        assert_eq!(error_message(StatusCode::FORBIDDEN, ""), "Forbidden");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let config = OrderServiceConfig::new("http://127.0.0.1:9")
            .with_read_retry(RetryConfig::disabled());
        let svc = HttpOrderService::new(config).unwrap();

        let err = svc.fetch_order(OrderId(1)).await.unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)));
    }

    fn mock_service(server: &MockServer, retry: RetryConfig) -> HttpOrderService {
        let config = OrderServiceConfig::new(server.base_url())
            .with_token("secret")
            .with_read_retry(retry);
        HttpOrderService::new(config).unwrap()
    }

    fn fast_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_update_sends_patch_with_status_body_and_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/orders/42/status")
                    .header("authorization", "Bearer secret")
                    .header_exists("x-request-id")
                    .json_body(json!({ "status": "CONFIRMED" }));
                then.status(200)
                    .json_body(json!({ "id": 42, "status": "CONFIRMED", "totalPrice": 12.5 }));
            })
            .await;
        let svc = mock_service(&server, fast_retry(3));

        let order = svc
            .update_order_status(OrderId(42), OrderStatus::Confirmed)
            .await
            .unwrap();

        mock.assert_hits_async(1).await;
        assert_eq!(order.id, OrderId(42));
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_update_is_not_retried_on_server_error() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH).path("/orders/42/status");
                then.status(503).body("down");
            })
            .await;
        let svc = mock_service(&server, fast_retry(3));

        let err = svc
            .update_order_status(OrderId(42), OrderStatus::Cancelled)
            .await
            .unwrap_err();

        mock.assert_hits_async(1).await;
        assert!(matches!(
            err,
            RemoteError::Http { status: 503, ref message } if message == "down"
        ));
    }

    #[tokio::test]
    async fn test_conflict_message_is_carried_into_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/orders/9/status");
                then.status(409)
                    .json_body(json!({ "status": 409, "message": "already done" }));
            })
            .await;
        let svc = mock_service(&server, fast_retry(3));

        let err = svc
            .update_order_status(OrderId(9), OrderStatus::Completed)
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "Order service returned HTTP 409: already done");
    }

    #[tokio::test]
    async fn test_fetch_retries_server_errors_up_to_max_attempts() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/orders/42");
                then.status(503).body("down");
            })
            .await;
        let svc = mock_service(&server, fast_retry(3));

        let err = svc.fetch_order(OrderId(42)).await.unwrap_err();

        mock.assert_hits_async(3).await;
        assert_eq!(err.status_code(), Some(503));
    }

    #[tokio::test]
    async fn test_fetch_does_not_retry_client_errors() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/orders/404");
                then.status(404).json_body(json!({ "message": "no such order" }));
            })
            .await;
        let svc = mock_service(&server, fast_retry(3));

        let err = svc.fetch_order(OrderId(404)).await.unwrap_err();

        mock.assert_hits_async(1).await;
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn test_fetch_decodes_wrapped_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/orders/7")
                    .header("authorization", "Bearer secret")
                    .header_exists("x-request-id");
                then.status(200).json_body(json!({
                    "data": { "id": 7, "status": "PENDING", "totalPrice": 3.0 }
                }));
            })
            .await;
        let svc = mock_service(&server, fast_retry(3));

        let order = svc.fetch_order(OrderId(7)).await.unwrap();

        mock.assert_hits_async(1).await;
        assert_eq!(order.id, OrderId(7));
        assert_eq!(order.status, OrderStatus::Pending);
    }
}
