// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Business rules only. HTTP, configuration and metrics live outside this
// layer and reach it through the traits in `order_service`.
//
// ============================================================================

pub mod order;
