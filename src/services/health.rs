use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::{error, trace};

use crate::storage::Storage;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        storage: web::Data<Arc<dyn Storage>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let backend = storage.get_backend_info().await;
        let storage_status =
            match tokio::time::timeout(Duration::from_secs(5), storage.ping()).await {
                Ok(Ok(())) => json!({
                    "status": "healthy",
                    "backend": backend,
                }),
                Ok(Err(e)) => {
                    error!("Storage ping failed: {}", e);
                    json!({
                        "status": "unhealthy",
                        "error": e.to_string(),
                        "backend": backend,
                    })
                }
                Err(_) => {
                    error!("Storage ping timeout");
                    json!({
                        "status": "unhealthy",
                        "error": "timeout",
                        "backend": backend,
                    })
                }
            };

        let now = chrono::Utc::now();
        let uptime_seconds = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;
        let is_healthy = storage_status["status"] == "healthy";

        let health_response = json!({
            "status": if is_healthy { "healthy" } else { "unhealthy" },
            "timestamp": now.to_rfc3339(),
            "uptime": uptime_seconds,
            "checks": {
                "storage": storage_status,
            },
            "response_time_ms": start_time.elapsed().as_millis()
        });

        let response_status = if is_healthy {
            actix_web::http::StatusCode::OK
        } else {
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        };

        HttpResponse::build(response_status)
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(health_response)
    }

    // 简单的就绪检查，只返回 200 状态码
    pub async fn readiness_check() -> impl Responder {
        trace!("Received readiness check request");

        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain"))
            .body("OK")
    }

    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}
