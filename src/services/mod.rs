pub mod assignment_lookup;
pub mod dashboard_service;
pub mod exam_service;
pub mod grading_service;
pub mod result_service;
pub mod schedule_service;
pub mod submission_service;
