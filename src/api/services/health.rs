use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use tracing::trace;

use super::helpers::json_ok;
use super::types::HealthResponse;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
    pub storage_backend: String,
}

pub struct HealthService;

impl HealthService {
    /// GET /api/health
    pub async fn health_check(start: web::Data<AppStartTime>) -> HttpResponse {
        trace!("Received health check request");
        let uptime = (Utc::now() - start.start_datetime).num_seconds().max(0);

        json_ok(&HealthResponse {
            status: "healthy".to_string(),
            storage: start.storage_backend.clone(),
            started_at: start.start_datetime,
            uptime_secs: uptime,
        })
    }
}
