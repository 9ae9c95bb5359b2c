mod admin_handler;

pub use admin_handler::{__path_approve_center, __path_list_users, approve_center, list_users};
