mod analytics_handler;

pub use analytics_handler::{__path_analytics_overview, analytics_overview};
