use std::sync::Arc;
use std::time::Instant;

use super::errors::TransitionError;
use super::transition::can_transition;
use super::value_objects::{Order, OrderStatus};
use crate::metrics::TransitionMetrics;
use crate::order_service::OrderStatusUpdater;

// ============================================================================
// Order Status Transition Guard
// ============================================================================
//
// Orchestrates: requested status -> transition table -> order service
//
// The guard holds no order state. The caller passes an order freshly read
// from the order service; the service remains the arbiter of final state
// and reports races as conflicts.
//
// ============================================================================

pub struct OrderStatusTransitionGuard<S: ?Sized> {
    service: Arc<S>,
    metrics: Option<TransitionMetrics>,
}

impl<S: OrderStatusUpdater + ?Sized> OrderStatusTransitionGuard<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: TransitionMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn can_transition(&self, current: OrderStatus, target: OrderStatus) -> bool {
        can_transition(current, target)
    }

    /// Validate `order.status -> target` and, if legal, ask the order
    /// service to apply it. Illegal requests never reach the service.
    /// Legal ones make exactly one call, whose result is returned as is.
    pub async fn request_transition(
        &self,
        order: &Order,
        target: OrderStatus,
    ) -> Result<Order, TransitionError> {
        let current = order.status;

        if !can_transition(current, target) {
            tracing::info!(
                order_id = %order.id,
                from = %current,
                to = %target,
                "Rejected illegal order status transition"
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_rejected(current, target);
            }
            return Err(TransitionError::Illegal { current, target });
        }

        let started = Instant::now();
        let result = self.service.update_order_status(order.id, target).await;
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(updated) => {
                tracing::info!(
                    order_id = %order.id,
                    from = %current,
                    to = %target,
                    "Order status updated"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_applied(current, target, elapsed);
                }
                Ok(updated)
            }
            Err(e) => {
                tracing::error!(
                    order_id = %order.id,
                    from = %current,
                    to = %target,
                    error = %e,
                    "Order service did not apply status change"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_remote_failure(e.kind(), elapsed);
                }
                Err(TransitionError::Remote(e))
            }
        }
    }
}
