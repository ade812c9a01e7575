//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod appointment;
pub mod barber;
pub mod customer;
pub mod payment_record;
pub mod service;
pub mod shop;
