//! Admin API
//!
//! Token-protected CRUD for mappings and options, the supplier/click
//! reports, and the manual link-health trigger. Validation is strict:
//! malformed payloads are rejected with a 400 and a usable message, never
//! silently coerced.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::BuylinkError;
use crate::services::link_health::LinkHealthService;
use crate::storage::{Mapping, Offer, OfferPatch, OfferStatus, Storage};
use crate::utils::validate_url;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub data: T,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostMapping {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ean: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub options: Vec<PostOption>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostOption {
    /// Server-assigned when omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub supplier: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub price_last_seen: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PatchOption {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price_last_seen: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MappingWithOptions {
    #[serde(flatten)]
    pub mapping: Mapping,
    pub options: Vec<Offer>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ClicksQuery {
    #[serde(default)]
    pub limit: Option<u64>,
}

fn ok_response<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse { code: 0, data })
}

fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "code": status.as_u16(),
        "data": { "error": message }
    }))
}

fn storage_error(e: BuylinkError) -> HttpResponse {
    match e {
        BuylinkError::NotFound(_) => error_response(StatusCode::NOT_FOUND, e.message()),
        BuylinkError::Validation(_) => error_response(StatusCode::BAD_REQUEST, e.message()),
        _ => {
            error!("Admin API storage error: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage failure")
        }
    }
}

pub struct AdminService;

impl AdminService {
    /// `POST /admin/mapping` — upsert a mapping together with its options.
    pub async fn upsert_mapping(
        body: web::Json<PostMapping>,
        storage: web::Data<Arc<dyn Storage>>,
    ) -> impl Responder {
        let payload = body.into_inner();

        if payload.id.trim().is_empty() {
            return error_response(StatusCode::BAD_REQUEST, "Mapping id must not be empty");
        }
        if payload.name.trim().is_empty() {
            return error_response(StatusCode::BAD_REQUEST, "Mapping name must not be empty");
        }
        for option in &payload.options {
            if option.supplier.trim().is_empty() {
                return error_response(StatusCode::BAD_REQUEST, "Option supplier must not be empty");
            }
            if let Err(e) = validate_url(&option.url) {
                return error_response(StatusCode::BAD_REQUEST, e.message());
            }
            if let Some(status) = &option.status {
                if let Err(e) = OfferStatus::parse(status) {
                    return error_response(StatusCode::BAD_REQUEST, e.message());
                }
            }
        }

        let now = Utc::now();
        // Keep the original creation time across upserts.
        let created_at = match storage.get_mapping(&payload.id).await {
            Ok(Some(existing)) => existing.created_at,
            Ok(None) => now,
            Err(e) => return storage_error(e),
        };

        let mapping = Mapping {
            id: payload.id.clone(),
            name: payload.name,
            ean: payload.ean,
            keywords: payload.keywords,
            created_at,
            updated_at: now,
        };
        if let Err(e) = storage.upsert_mapping(mapping.clone()).await {
            return storage_error(e);
        }

        let mut stored_options = Vec::with_capacity(payload.options.len());
        for option in payload.options {
            let status = match option.status.as_deref() {
                Some(s) => OfferStatus::parse(s).unwrap_or(OfferStatus::Active),
                None => OfferStatus::Active,
            };
            let offer = Offer {
                id: option
                    .id
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                mapping_id: mapping.id.clone(),
                supplier: option.supplier,
                title: option.title,
                url: option.url,
                status,
                price_last_seen: option.price_last_seen,
                deactivated_reason: None,
                updated_at: Utc::now(),
            };
            if let Err(e) = storage.upsert_offer(offer.clone()).await {
                return storage_error(e);
            }
            stored_options.push(offer);
        }

        info!(
            "Admin API: mapping {} upserted with {} options",
            mapping.id,
            stored_options.len()
        );
        ok_response(MappingWithOptions {
            mapping,
            options: stored_options,
        })
    }

    /// `GET /admin/mappings`
    pub async fn list_mappings(storage: web::Data<Arc<dyn Storage>>) -> impl Responder {
        match storage.all_mappings().await {
            Ok(mappings) => ok_response(mappings),
            Err(e) => storage_error(e),
        }
    }

    /// `GET /admin/mapping/{id}` — mapping plus its options, 404 when missing.
    pub async fn get_mapping(
        path: web::Path<String>,
        storage: web::Data<Arc<dyn Storage>>,
    ) -> impl Responder {
        let id = path.into_inner();
        let mapping = match storage.get_mapping(&id).await {
            Ok(Some(m)) => m,
            Ok(None) => {
                return error_response(
                    StatusCode::NOT_FOUND,
                    &format!("Mapping not found: {}", id),
                )
            }
            Err(e) => return storage_error(e),
        };
        match storage.offers_for_mapping(&id).await {
            Ok(options) => ok_response(MappingWithOptions { mapping, options }),
            Err(e) => storage_error(e),
        }
    }

    /// `DELETE /admin/mapping/{id}` — cascades to the mapping's options.
    pub async fn delete_mapping(
        path: web::Path<String>,
        storage: web::Data<Arc<dyn Storage>>,
    ) -> impl Responder {
        let id = path.into_inner();
        match storage.delete_mapping(&id).await {
            Ok(()) => {
                info!("Admin API: mapping {} deleted", id);
                ok_response(json!({ "deleted": id }))
            }
            Err(e) => storage_error(e),
        }
    }

    /// `PATCH /admin/option/{id}` — partial update; setting status back to
    /// `active` is the manual reactivation path.
    pub async fn patch_option(
        path: web::Path<String>,
        body: web::Json<PatchOption>,
        storage: web::Data<Arc<dyn Storage>>,
    ) -> impl Responder {
        let id = path.into_inner();
        let payload = body.into_inner();

        let status = match payload.status.as_deref() {
            Some(s) => match OfferStatus::parse(s) {
                Ok(status) => Some(status),
                Err(e) => return error_response(StatusCode::BAD_REQUEST, e.message()),
            },
            None => None,
        };
        if let Some(url) = &payload.url {
            if let Err(e) = validate_url(url) {
                return error_response(StatusCode::BAD_REQUEST, e.message());
            }
        }

        let patch = OfferPatch {
            status,
            url: payload.url,
            title: payload.title,
            price_last_seen: payload.price_last_seen,
        };
        match storage.update_offer(&id, patch).await {
            Ok(offer) => {
                info!("Admin API: option {} updated", id);
                ok_response(offer)
            }
            Err(e) => storage_error(e),
        }
    }

    /// `DELETE /admin/option/{id}`
    pub async fn delete_option(
        path: web::Path<String>,
        storage: web::Data<Arc<dyn Storage>>,
    ) -> impl Responder {
        let id = path.into_inner();
        match storage.delete_offer(&id).await {
            Ok(()) => {
                info!("Admin API: option {} deleted", id);
                ok_response(json!({ "deleted": id }))
            }
            Err(e) => storage_error(e),
        }
    }

    /// `POST /admin/link-health` — runs the prober and reports every option
    /// it just deactivated, for manual review/reactivation.
    pub async fn run_link_health(
        link_health: web::Data<Arc<LinkHealthService>>,
    ) -> impl Responder {
        match link_health.probe_all().await {
            Ok(changed) => ok_response(json!({ "changed": changed })),
            Err(e) => {
                error!("Link health run failed: {}", e);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e.message())
            }
        }
    }

    /// `GET /admin/suppliers`
    pub async fn list_suppliers(storage: web::Data<Arc<dyn Storage>>) -> impl Responder {
        match storage.all_suppliers().await {
            Ok(suppliers) => ok_response(suppliers),
            Err(e) => storage_error(e),
        }
    }

    /// `GET /admin/mapping/{id}/clicks` — recent clicks, newest first.
    pub async fn mapping_clicks(
        path: web::Path<String>,
        query: web::Query<ClicksQuery>,
        storage: web::Data<Arc<dyn Storage>>,
    ) -> impl Responder {
        let id = path.into_inner();
        let limit = query.limit.unwrap_or(100).clamp(1, 1000);
        match storage.clicks_for_mapping(&id, limit).await {
            Ok(clicks) => ok_response(clicks),
            Err(e) => storage_error(e),
        }
    }
}

/// Admin route table. Auth, rate limiting and CORS are wrapped around this
/// scope by the caller.
pub fn admin_routes() -> actix_web::Scope {
    web::scope("/admin")
        .route("/mappings", web::get().to(AdminService::list_mappings))
        .route("/mapping", web::post().to(AdminService::upsert_mapping))
        .route(
            "/mapping/{id}/clicks",
            web::get().to(AdminService::mapping_clicks),
        )
        .route("/mapping/{id}", web::get().to(AdminService::get_mapping))
        .route("/mapping/{id}", web::delete().to(AdminService::delete_mapping))
        .route("/option/{id}", web::patch().to(AdminService::patch_option))
        .route("/option/{id}", web::delete().to(AdminService::delete_option))
        .route("/link-health", web::post().to(AdminService::run_link_health))
        .route("/suppliers", web::get().to(AdminService::list_suppliers))
}
