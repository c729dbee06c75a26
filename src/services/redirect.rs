//! Public redirect endpoint
//!
//! `GET /go/{mapping_id}`: record the click, resolve the target, answer
//! with 302. There is no 404 outcome on this path — an unknown or dead
//! mapping redirects to the fallback category page so a shared or printed
//! link never dead-ends for the user.

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::{debug, warn};

use crate::services::click::ClickRecorder;
use crate::services::resolver::Resolver;

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        path: web::Path<String>,
        req: HttpRequest,
        recorder: web::Data<Arc<ClickRecorder>>,
        resolver: web::Data<Arc<Resolver>>,
    ) -> impl Responder {
        let mapping_id = path.into_inner();

        let user_agent = header_value(&req, "User-Agent");
        let referer = header_value(&req, "Referer");

        // Best effort: a failed click write must never fail the redirect.
        if let Err(e) = recorder.record(&mapping_id, user_agent, referer).await {
            warn!("Click recording failed for mapping {}: {}", mapping_id, e);
        }

        let target = resolver.resolve(&mapping_id).await;
        debug!("Redirecting {} -> {}", mapping_id, target);

        // 302, not permanent: the winning option changes over time.
        HttpResponse::Found()
            .insert_header(("Location", target))
            .finish()
    }
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
