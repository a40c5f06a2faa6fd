use super::value_objects::OrderStatus;
use crate::order_service::RemoteError;

// ============================================================================
// Order Status Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct ParseStatusError(pub String);

/// Failure of a requested status change.
///
/// `Illegal` is detected locally and never touches the network, so the
/// caller can tell "not allowed" apart from "try again".
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Cannot move order from {current} to {target}")]
    Illegal {
        current: OrderStatus,
        target: OrderStatus,
    },

    #[error("Order service failed to apply status change: {0}")]
    Remote(#[from] RemoteError),
}

impl TransitionError {
    pub fn is_illegal(&self) -> bool {
        matches!(self, TransitionError::Illegal { .. })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, TransitionError::Remote(_))
    }
}
