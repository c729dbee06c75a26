use actix_web::middleware::Next;
use actix_web::{
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web, Error, HttpResponse,
};
use subtle::ConstantTimeEq;
use tracing::{debug, info};

use crate::config::AppConfig;

pub struct AdminAuth;

impl AdminAuth {
    /// Admin API bearer-token check.
    ///
    /// Missing `Authorization` header answers 401, a present-but-wrong token
    /// answers 403. An empty configured token disables the whole admin
    /// surface (404). Token comparison is constant-time.
    pub async fn admin_auth(
        req: ServiceRequest,
        next: Next<BoxBody>,
    ) -> Result<ServiceResponse<BoxBody>, Error> {
        if req.method() == actix_web::http::Method::OPTIONS {
            // CORS preflight passes through without credentials.
            return Ok(req.into_response(HttpResponse::NoContent().finish()));
        }

        let admin_token = req
            .app_data::<web::Data<AppConfig>>()
            .map(|config| config.api.admin_token.clone())
            .unwrap_or_default();

        if admin_token.is_empty() {
            return Ok(req.into_response(
                HttpResponse::NotFound()
                    .insert_header(("Content-Type", "text/html; charset=utf-8"))
                    .body("Not Found"),
            ));
        }

        let Some(auth_header) = req.headers().get("Authorization") else {
            info!("Admin API: missing Authorization header");
            return Ok(req.into_response(
                HttpResponse::Unauthorized().json(serde_json::json!({
                    "code": 401,
                    "data": { "error": "Missing Authorization header" }
                })),
            ));
        };

        if let Some(token_bytes) = auth_header.as_bytes().strip_prefix(b"Bearer ") {
            if bool::from(token_bytes.ct_eq(admin_token.as_bytes())) {
                debug!("Admin API authentication succeeded");
                return next.call(req).await;
            }
        }

        info!("Admin API: token mismatch");
        Ok(req.into_response(
            HttpResponse::Forbidden().json(serde_json::json!({
                "code": 403,
                "data": { "error": "Invalid admin token" }
            })),
        ))
    }
}
