//! Deterministic categorization and Gemini-backed e-waste verification.

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::{co2_factor, ClassifierService, EwasteVerifier, GeminiVerifier, Prediction, Verdict};
