mod report_service;
pub mod rewards;
mod submission_service;

pub use report_service::ReportService;
pub use submission_service::{SubmissionService, UploadedImage};
