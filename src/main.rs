use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::Governor;
use actix_web::middleware::{from_fn, Compress};
use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use buylink::config::{ApiConfig, AppConfig};
use buylink::middleware::{admin_rate_limit_config, AdminAuth};
use buylink::services::{
    admin_routes, AppStartTime, ClickRecorder, HealthService, LinkHealthService, RedirectService,
    Resolver,
};
use buylink::storage::{ensure_default_suppliers, Storage, StorageFactory};

fn build_cors(api: &ApiConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
        .max_age(3600);

    if api.cors_origin == "*" {
        cors.allow_any_origin()
    } else {
        cors.allowed_origin(&api.cors_origin)
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let config = AppConfig::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let storage: Arc<dyn Storage> = StorageFactory::create(&config.database)
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;

    match ensure_default_suppliers(storage.as_ref()).await {
        Ok(0) => {}
        Ok(n) => info!("Seeded {} default suppliers", n),
        Err(e) => warn!("Supplier seeding failed: {}", e),
    }

    let resolver = Arc::new(Resolver::new(storage.clone(), &config));
    let recorder = Arc::new(ClickRecorder::new(storage.clone()));
    let link_health = Arc::new(
        LinkHealthService::from_config(storage.clone(), &config)
            .map_err(|e| io::Error::other(e.to_string()))?,
    );

    if config.api.admin_token.is_empty() {
        info!("Admin API is disabled (ADMIN_TOKEN not set)");
    } else {
        info!("Admin API available at /admin");
    }

    let bind_addr = (config.server.host.clone(), config.server.port);
    info!("Starting buylink on {}:{}", bind_addr.0, bind_addr.1);

    // One limiter config for all workers, so the admin budget does not
    // multiply with worker count.
    let rate_limit_config = admin_rate_limit_config(&config.api);

    let server_config = config.clone();
    HttpServer::new(move || {
        let config = server_config.clone();
        let cors = build_cors(&config.api);

        App::new()
            .wrap(Compress::default())
            .app_data(web::Data::new(config))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(resolver.clone()))
            .app_data(web::Data::new(recorder.clone()))
            .app_data(web::Data::new(link_health.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .route("/go/{mapping_id}", web::get().to(RedirectService::handle_redirect))
            .route("/health", web::get().to(HealthService::health_check))
            .route("/health/live", web::get().to(HealthService::liveness_check))
            .route("/health/ready", web::get().to(HealthService::readiness_check))
            .service(
                admin_routes()
                    .wrap(from_fn(AdminAuth::admin_auth))
                    .wrap(Governor::new(&rate_limit_config))
                    .wrap(cors),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
