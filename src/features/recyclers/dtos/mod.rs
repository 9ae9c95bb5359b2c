mod center_dto;

pub use center_dto::{CenterResponseDto, CreateCenterDto, UpdateReportStatusDto};
