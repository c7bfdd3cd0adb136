pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::database::store::Store;
use crate::services::{
    dashboard_service::DashboardService, exam_service::ExamService,
    result_service::ResultService, schedule_service::ScheduleService,
    submission_service::SubmissionService,
};
use crate::utils::time::Clock;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub schedule_service: ScheduleService,
    pub exam_service: ExamService,
    pub submission_service: SubmissionService,
    pub result_service: ResultService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        tracing::info!(backend = store.backend_tag(), "assembling application state");
        Self {
            schedule_service: ScheduleService::new(store.clone(), clock.clone()),
            exam_service: ExamService::new(store.clone()),
            submission_service: SubmissionService::new(store.clone(), clock),
            result_service: ResultService::new(store.clone()),
            dashboard_service: DashboardService::new(store.clone()),
            store,
        }
    }
}
