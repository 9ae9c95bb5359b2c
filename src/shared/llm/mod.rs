//! LLM response handling
//!
//! Extracts and repairs JSON payloads from free-form model output.

mod parser;

pub use parser::{extract_json_string, parse_object};
