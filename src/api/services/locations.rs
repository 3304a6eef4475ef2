//! Query surface
//!
//! Four read-only operations: resolve by IP (path or query parameter,
//! defaulting to the caller's address), resolve this instance's public
//! location, and the public/local address sets. Client-visible payloads
//! never include `last_updated`.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::errors::IpLocatorError;
use crate::repository::Location;
use crate::services::LocationService;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub data: T,
}

/// Client-visible Location payload
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LocationResponse {
    pub id: String,
    pub ip: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub country_code: String,
    pub continent: String,
    pub latitude: String,
    pub longitude: String,
}

impl From<Location> for LocationResponse {
    fn from(location: Location) -> Self {
        Self {
            id: location.id,
            ip: location.ip,
            city: location.city,
            region: location.region,
            country: location.country,
            country_code: location.country_code,
            continent: location.continent,
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct IpsResponse {
    pub ips: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct ResolveQuery {
    pub ip: Option<String>,
}

fn location_response(location: Location) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse {
        code: 0,
        data: LocationResponse::from(location),
    })
}

fn error_response(err: IpLocatorError) -> HttpResponse {
    let status = match err {
        IpLocatorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        IpLocatorError::NoAddressAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        IpLocatorError::Cancelled(_) => StatusCode::REQUEST_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    HttpResponse::build(status).json(ApiResponse {
        code: status.as_u16() as i32,
        data: err.to_string(),
    })
}

/// Audit user identifier from the request headers
fn user_id(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("x-user-id")
        .and_then(|h| h.to_str().ok())
        .map(String::from)
}

/// Caller address: X-Forwarded-For first (first entry), then X-Real-IP,
/// then the connection peer
fn client_ip(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            req.headers()
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        })
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
}

pub struct LocationsService;

impl LocationsService {
    /// GET /locations/{ip}
    pub async fn get_location_by_path(
        req: HttpRequest,
        path: web::Path<String>,
        service: web::Data<Arc<LocationService>>,
    ) -> impl Responder {
        let ip = path.into_inner();
        trace!("Resolving location for {}", ip);

        let cancel = CancellationToken::new();
        match service
            .resolve_location(&ip, user_id(&req).as_deref(), &cancel)
            .await
        {
            Ok(location) => location_response(location),
            Err(e) => error_response(e),
        }
    }

    /// GET /locations?ip=... (defaults to the caller's own address)
    pub async fn get_location(
        req: HttpRequest,
        query: web::Query<ResolveQuery>,
        service: web::Data<Arc<LocationService>>,
    ) -> impl Responder {
        let Some(ip) = query.ip.clone().or_else(|| client_ip(&req)) else {
            return error_response(IpLocatorError::invalid_input(
                "no ip parameter and no client address",
            ));
        };

        let cancel = CancellationToken::new();
        match service
            .resolve_location(&ip, user_id(&req).as_deref(), &cancel)
            .await
        {
            Ok(location) => location_response(location),
            Err(e) => error_response(e),
        }
    }

    /// GET /locations/current
    pub async fn get_current_location(
        req: HttpRequest,
        service: web::Data<Arc<LocationService>>,
    ) -> impl Responder {
        let cancel = CancellationToken::new();
        match service
            .resolve_current_location(user_id(&req).as_deref(), &cancel)
            .await
        {
            Ok(location) => location_response(location),
            Err(e) => error_response(e),
        }
    }

    /// GET /ips/public
    pub async fn get_public_ips(service: web::Data<Arc<LocationService>>) -> impl Responder {
        let ips = service
            .address_book()
            .public_addresses()
            .iter()
            .map(|addr| addr.to_string())
            .collect();

        HttpResponse::Ok().json(ApiResponse {
            code: 0,
            data: IpsResponse { ips },
        })
    }

    /// GET /ips/local
    pub async fn get_local_ips(service: web::Data<Arc<LocationService>>) -> impl Responder {
        let ips = service
            .address_book()
            .local_addresses()
            .iter()
            .map(|addr| addr.to_string())
            .collect();

        HttpResponse::Ok().json(ApiResponse {
            code: 0,
            data: IpsResponse { ips },
        })
    }
}

pub fn location_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/locations")
            .route("/current", web::get().to(LocationsService::get_current_location))
            .route("/{ip}", web::get().to(LocationsService::get_location_by_path))
            .route("", web::get().to(LocationsService::get_location)),
    )
    .service(
        web::scope("/ips")
            .route("/public", web::get().to(LocationsService::get_public_ips))
            .route("/local", web::get().to(LocationsService::get_local_ips)),
    );
}
