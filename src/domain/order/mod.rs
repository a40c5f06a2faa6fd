// ============================================================================
// Order Domain - Status Lifecycle
// ============================================================================
//
// This module contains ALL order-specific code:
// - Value objects (Order, OrderId, OrderStatus)
// - Transition table (allowed next statuses)
// - Errors (TransitionError, ParseStatusError)
// - Guard (OrderStatusTransitionGuard)
//
// Orders are owned by the external order service; nothing here stores them.
//
// ============================================================================

pub mod value_objects;
pub mod transition;
pub mod errors;
pub mod guard;

// Re-export for convenience
pub use value_objects::*;
pub use transition::*;
pub use errors::*;
pub use guard::*;
