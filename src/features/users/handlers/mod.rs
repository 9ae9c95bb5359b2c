pub mod user_handler;

pub use user_handler::{__path_get_me, __path_get_stats, get_me, get_stats, UserState};
