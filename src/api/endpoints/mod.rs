//! Endpoint handlers.

pub mod admin;
pub mod checkins;
pub mod health;
pub mod patients;
pub mod products;
