pub mod config;
pub mod domain;
pub mod metrics;
pub mod order_service;
pub mod utils;

pub use config::OrderServiceConfig;
pub use domain::order::{
    allowed_targets, can_transition, Order, OrderId, OrderStatus, OrderStatusTransitionGuard,
    TransitionError,
};
pub use order_service::{HttpOrderService, OrderReader, OrderStatusUpdater, RemoteError};
