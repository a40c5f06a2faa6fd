use super::value_objects::OrderStatus;

// ============================================================================
// Order Status Transition Table
// ============================================================================
//
// PENDING   -> CONFIRMED | CANCELLED
// CONFIRMED -> COMPLETED | CANCELLED
// COMPLETED -> (terminal)
// CANCELLED -> (terminal)
//
// No self edges. Orders cannot skip confirmation or be revived once
// completed or cancelled.
//
// ============================================================================

/// Statuses reachable in one step from `current`.
pub fn allowed_targets(current: OrderStatus) -> &'static [OrderStatus] {
    match current {
        OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
        OrderStatus::Confirmed => &[OrderStatus::Completed, OrderStatus::Cancelled],
        OrderStatus::Completed | OrderStatus::Cancelled => &[],
    }
}

pub fn can_transition(current: OrderStatus, target: OrderStatus) -> bool {
    allowed_targets(current).contains(&target)
}
