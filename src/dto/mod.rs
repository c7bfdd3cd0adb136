pub mod dashboard_dto;
pub mod exam_dto;
pub mod result_dto;
pub mod schedule_dto;
pub mod submission_dto;
