mod report_handler;

pub use report_handler::{__path_create_report, __path_history, create_report, history};
