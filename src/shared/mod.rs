pub mod constants;
pub mod llm;
pub mod test_helpers;
pub mod types;
