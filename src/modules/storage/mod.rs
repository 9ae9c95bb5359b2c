//! Storage module for uploaded report images
//!
//! Writes files to a local directory served statically at `/uploads`.

mod upload_store;

pub use upload_store::UploadStore;
