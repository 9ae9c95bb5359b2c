mod classifier_service;
mod verifier_service;

pub use classifier_service::{co2_factor, ClassifierService, Prediction};
pub use verifier_service::{EwasteVerifier, GeminiVerifier, Verdict};
