use std::sync::Arc;
use std::time::Duration;

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{error, trace};

use crate::repository::LocationRepository;
use crate::utils::location_id;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub storage: HealthStorageCheck,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthStorageCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        repository: web::Data<Arc<dyn LocationRepository>>,
    ) -> impl Responder {
        trace!("Received health check request");

        // A single bounded primary-key read, no data loaded
        let probe_id = location_id("127.0.0.1");
        let probe = repository.get_by_id(&probe_id);
        let storage = match tokio::time::timeout(Duration::from_secs(5), probe).await {
            Ok(Ok(_)) => HealthStorageCheck {
                status: "healthy".to_string(),
                error: None,
            },
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    error: Some(e.to_string()),
                }
            }
            Err(_) => {
                error!("Storage health check timeout");
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    error: Some("timeout".to_string()),
                }
            }
        };

        let healthy = storage.status == "healthy";
        let body = HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            storage,
        };

        if healthy {
            HttpResponse::Ok().json(body)
        } else {
            HttpResponse::ServiceUnavailable().json(body)
        }
    }
}

pub fn health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(HealthService::health_check));
}
