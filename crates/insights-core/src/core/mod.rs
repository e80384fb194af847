//! Business logic layer: query state, views and services.

pub mod explorer;
pub mod query;
pub mod services;
pub mod views;
