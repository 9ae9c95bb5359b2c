//! Recycling centers and the recycler-side work queue.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
