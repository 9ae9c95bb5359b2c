mod center_service;
mod recycling_service;

pub use center_service::CenterService;
pub use recycling_service::RecyclingService;
