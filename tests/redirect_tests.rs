//! Redirect endpoint tests
//!
//! The public path: mapping id in, 302 out, exactly one click recorded,
//! and never an error page for the user.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use chrono::Utc;

use buylink::config::{AffiliateMode, RedirectConfig};
use buylink::services::{ClickRecorder, RedirectService, Resolver};
use buylink::storage::{MemoryStorage, Offer, OfferStatus, Storage};

mod support;
use support::FlakyStorage;

fn seed_offer(id: &str, mapping_id: &str, url: &str) -> Offer {
    Offer {
        id: id.to_string(),
        mapping_id: mapping_id.to_string(),
        supplier: "rewe".to_string(),
        title: "test offer".to_string(),
        url: url.to_string(),
        status: OfferStatus::Active,
        price_last_seen: Some(2.49),
        deactivated_reason: None,
        updated_at: Utc::now(),
    }
}

macro_rules! redirect_app {
    ($storage:expr) => {{
        let storage: Arc<dyn Storage> = $storage.clone();
        let resolver = Arc::new(Resolver::with_parts(
            storage.clone(),
            RedirectConfig::default(),
            AffiliateMode::Off,
        ));
        let recorder = Arc::new(ClickRecorder::new(storage.clone()));
        test::init_service(
            App::new()
                .app_data(web::Data::new(resolver))
                .app_data(web::Data::new(recorder))
                .route(
                    "/go/{mapping_id}",
                    web::get().to(RedirectService::handle_redirect),
                ),
        )
        .await
    }};
}

#[tokio::test]
async fn redirect_answers_302_with_location() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    storage
        .upsert_offer(seed_offer("o1", "m1", "https://shop.example/a"))
        .await
        .unwrap();
    let app = redirect_app!(storage);

    let resp = TestRequest::get()
        .uri("/go/m1")
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp
        .headers()
        .get("Location")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.starts_with("https://shop.example/a"));
    assert!(location.contains("utm_source=buylink"));
}

#[tokio::test]
async fn unknown_mapping_redirects_to_fallback_not_404() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let app = redirect_app!(storage);

    let resp = TestRequest::get()
        .uri("/go/nope")
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert!(location.starts_with(&RedirectConfig::default().fallback_url));
}

#[tokio::test]
async fn every_redirect_records_exactly_one_click() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    storage
        .upsert_offer(seed_offer("o1", "m1", "https://shop.example/a"))
        .await
        .unwrap();
    let app = redirect_app!(storage);

    for _ in 0..3 {
        TestRequest::get().uri("/go/m1").send_request(&app).await;
    }
    // fallback path records a click too
    TestRequest::get().uri("/go/ghost").send_request(&app).await;

    let m1_clicks = storage.clicks_for_mapping("m1", 100).await.unwrap();
    assert_eq!(m1_clicks.len(), 3);
    let ghost_clicks = storage.clicks_for_mapping("ghost", 100).await.unwrap();
    assert_eq!(ghost_clicks.len(), 1);
}

#[tokio::test]
async fn click_captures_user_agent_and_referer() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    storage
        .upsert_offer(seed_offer("o1", "m1", "https://shop.example/a"))
        .await
        .unwrap();
    let app = redirect_app!(storage);

    TestRequest::get()
        .uri("/go/m1")
        .insert_header(("User-Agent", "test-browser/1.0"))
        .insert_header(("Referer", "https://blog.example/post"))
        .send_request(&app)
        .await;

    let clicks = storage.clicks_for_mapping("m1", 10).await.unwrap();
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].user_agent.as_deref(), Some("test-browser/1.0"));
    assert_eq!(clicks[0].referer.as_deref(), Some("https://blog.example/post"));
}

#[tokio::test]
async fn failed_click_write_does_not_fail_the_redirect() {
    let storage: Arc<dyn Storage> = Arc::new(FlakyStorage::new().failing_click_writes());
    storage
        .upsert_offer(seed_offer("o1", "m1", "https://shop.example/a"))
        .await
        .unwrap();
    let app = redirect_app!(storage);

    let resp = TestRequest::get().uri("/go/m1").send_request(&app).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert!(location.starts_with("https://shop.example/a"));
    // the click is lost, the user still gets redirected
    assert!(storage.clicks_for_mapping("m1", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn storage_read_failure_still_answers_302_to_fallback() {
    let storage: Arc<dyn Storage> = Arc::new(FlakyStorage::new().failing_active_reads());
    storage
        .upsert_offer(seed_offer("o1", "m1", "https://shop.example/a"))
        .await
        .unwrap();
    let app = redirect_app!(storage);

    let resp = TestRequest::get().uri("/go/m1").send_request(&app).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert!(location.starts_with(&RedirectConfig::default().fallback_url));
}

#[tokio::test]
async fn headers_are_optional() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let app = redirect_app!(storage);

    let resp = TestRequest::get().uri("/go/m1").send_request(&app).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let clicks = storage.clicks_for_mapping("m1", 10).await.unwrap();
    assert_eq!(clicks[0].user_agent, None);
    assert_eq!(clicks[0].referer, None);
}
