//! HTTP handlers.

pub mod availability_handler;
pub mod booking_handler;
pub mod health_handler;

pub use availability_handler::availability_routes;
pub use booking_handler::booking_routes;
pub use health_handler::health_routes;
