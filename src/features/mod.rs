pub mod admin;
pub mod analytics;
pub mod auth;
pub mod ml;
pub mod recyclers;
pub mod reports;
pub mod users;
