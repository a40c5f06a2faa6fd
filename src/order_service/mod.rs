// Private module declaration
mod http;

use async_trait::async_trait;

use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::utils::IsTransient;

pub use http::HttpOrderService;

// ============================================================================
// Order Service - external owner of order state
// ============================================================================
//
// The order service is the source of truth for every order. This crate
// only reads orders and asks the service to change their status.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Order service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Order service unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Order service response could not be decoded: {0}")]
    Decode(String),
}

impl RemoteError {
    /// HTTP status code, when the service answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RemoteError::Http { status, .. } => Some(*status),
            RemoteError::Transport(_) | RemoteError::Decode(_) => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(409)
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteError::Http { status, .. } if *status == 409 => "conflict",
            RemoteError::Http { status, .. } if *status == 401 || *status == 403 => "unauthorized",
            RemoteError::Http { .. } => "http",
            RemoteError::Transport(_) => "transport",
            RemoteError::Decode(_) => "decode",
        }
    }
}

impl IsTransient for RemoteError {
    fn is_transient(&self) -> bool {
        match self {
            RemoteError::Http { status, .. } => *status == 429 || *status >= 500,
            RemoteError::Transport(_) => true,
            RemoteError::Decode(_) => false,
        }
    }
}

/// The single write the transition guard performs.
#[async_trait]
pub trait OrderStatusUpdater: Send + Sync {
    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RemoteError>;
}

#[async_trait]
pub trait OrderReader: Send + Sync {
    async fn fetch_order(&self, order_id: OrderId) -> Result<Order, RemoteError>;
}
