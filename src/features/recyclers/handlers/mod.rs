mod center_handler;
mod recycling_handler;

pub use center_handler::{
    __path_claim_center, __path_create_center, __path_list_centers, claim_center, create_center,
    list_centers,
};
pub use recycling_handler::{
    __path_assigned_reports, __path_update_report_status, assigned_reports, update_report_status,
};
