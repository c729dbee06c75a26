//! Resolver tests
//!
//! Option selection, fallback guarantee and the transformation pipeline.

use std::sync::Arc;

use chrono::{Duration, Utc};

use buylink::config::{AffiliateMode, RedirectConfig};
use buylink::services::Resolver;
use buylink::storage::{MemoryStorage, Offer, OfferStatus, Storage};

mod support;
use support::FlakyStorage;

fn offer(id: &str, mapping_id: &str, url: &str, status: OfferStatus, age_secs: i64) -> Offer {
    Offer {
        id: id.to_string(),
        mapping_id: mapping_id.to_string(),
        supplier: "amazon".to_string(),
        title: format!("offer {}", id),
        url: url.to_string(),
        status,
        price_last_seen: None,
        deactivated_reason: None,
        updated_at: Utc::now() - Duration::seconds(age_secs),
    }
}

fn resolver_with(storage: Arc<MemoryStorage>, affiliate: AffiliateMode) -> Resolver {
    Resolver::with_parts(storage, RedirectConfig::default(), affiliate)
}

#[tokio::test]
async fn active_option_wins_over_fallback() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .upsert_offer(offer("o1", "m1", "https://shop.example/a", OfferStatus::Active, 60))
        .await
        .unwrap();

    let resolver = resolver_with(storage, AffiliateMode::Off);
    let url = resolver.resolve("m1").await;

    assert!(url.starts_with("https://shop.example/a"));
    assert!(!url.contains("zutaten"));
}

#[tokio::test]
async fn most_recently_updated_active_option_wins() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .upsert_offer(offer("o1", "m1", "https://shop.example/a", OfferStatus::Active, 120))
        .await
        .unwrap();
    storage
        .upsert_offer(offer("o2", "m1", "https://shop.example/b", OfferStatus::Active, 10))
        .await
        .unwrap();

    let resolver = resolver_with(storage, AffiliateMode::Off);
    let url = resolver.resolve("m1").await;

    assert!(url.starts_with("https://shop.example/b"));
}

#[tokio::test]
async fn unknown_mapping_resolves_to_fallback_with_utm() {
    let storage = Arc::new(MemoryStorage::new());
    let resolver = resolver_with(storage, AffiliateMode::Off);

    let url = resolver.resolve("m2").await;

    assert!(url.starts_with(&RedirectConfig::default().fallback_url));
    assert!(url.contains("utm_source=buylink"));
    assert!(url.contains("utm_medium=redirect"));
    assert!(url.contains("utm_campaign=product-links"));
}

#[tokio::test]
async fn all_inactive_options_resolve_to_fallback() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .upsert_offer(offer("o1", "m1", "https://shop.example/a", OfferStatus::Inactive, 10))
        .await
        .unwrap();

    let resolver = resolver_with(storage, AffiliateMode::Off);
    let url = resolver.resolve("m1").await;

    assert!(url.starts_with(&RedirectConfig::default().fallback_url));
}

#[tokio::test]
async fn utm_parameters_present_on_every_result() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .upsert_offer(offer("o1", "m1", "https://shop.example/a?x=1", OfferStatus::Active, 10))
        .await
        .unwrap();

    let resolver = resolver_with(storage, AffiliateMode::Off);
    let url = resolver.resolve("m1").await;

    assert!(url.contains("x=1"));
    assert!(url.contains("utm_source=buylink"));
}

#[tokio::test]
async fn affiliate_wrap_happens_before_utm_tagging() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .upsert_offer(offer("o1", "m1", "https://shop.example/a", OfferStatus::Active, 10))
        .await
        .unwrap();

    let resolver = resolver_with(
        storage,
        AffiliateMode::Skimlinks {
            site_id: "12345X99".to_string(),
        },
    );
    let url = resolver.resolve("m1").await;

    assert!(url.starts_with("https://go.skimresources.com/"));
    // tags on the wrapper, original embedded encoded
    assert!(url.contains("utm_source=buylink"));
    assert!(url.contains("https%3A%2F%2Fshop.example%2Fa"));
}

#[tokio::test]
async fn storage_read_failure_degrades_to_fallback() {
    let storage = Arc::new(FlakyStorage::new().failing_active_reads());
    // an active offer exists, but the read path is broken
    storage
        .upsert_offer(offer("o1", "m1", "https://shop.example/a", OfferStatus::Active, 10))
        .await
        .unwrap();

    let resolver = Resolver::with_parts(storage, RedirectConfig::default(), AffiliateMode::Off);
    let url = resolver.resolve("m1").await;

    assert!(url.starts_with(&RedirectConfig::default().fallback_url));
    assert!(url.contains("utm_source=buylink"));
}

#[tokio::test]
async fn resolve_is_deterministic() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .upsert_offer(offer("o1", "m1", "https://shop.example/a", OfferStatus::Active, 10))
        .await
        .unwrap();

    let resolver = resolver_with(storage, AffiliateMode::Off);
    let first = resolver.resolve("m1").await;
    let second = resolver.resolve("m1").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn resolve_never_mutates_state() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .upsert_offer(offer("o1", "m1", "https://shop.example/a", OfferStatus::Active, 10))
        .await
        .unwrap();

    let resolver = resolver_with(storage.clone(), AffiliateMode::Off);
    resolver.resolve("m1").await;
    resolver.resolve("does-not-exist").await;

    let stored = storage.get_offer("o1").await.unwrap().unwrap();
    assert_eq!(stored.status, OfferStatus::Active);
    assert_eq!(stored.url, "https://shop.example/a");
}
