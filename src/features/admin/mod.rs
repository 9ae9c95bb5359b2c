//! Admin operations: center approval and account oversight.

pub mod handlers;
pub mod routes;
pub mod services;

pub use services::AdminService;
