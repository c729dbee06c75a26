//! Persistence layer
//!
//! A single [`Storage`] trait covers mappings, options, clicks and
//! suppliers. Two backends implement it: [`SeaOrmStorage`] (SQLite,
//! MySQL/MariaDB, PostgreSQL) for real deployments and [`MemoryStorage`]
//! for tests and throwaway setups. All writes are atomic per row; nothing
//! here needs multi-row transactions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::config::DatabaseConfig;
use crate::errors::{BuylinkError, Result};

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStorage;
pub use memory::MemoryStorage;
pub use models::{Click, Mapping, Offer, OfferPatch, OfferStatus, StorageInfo, Supplier};

#[async_trait]
pub trait Storage: Send + Sync {
    // --- mappings ---
    async fn upsert_mapping(&self, mapping: Mapping) -> Result<()>;
    async fn get_mapping(&self, id: &str) -> Result<Option<Mapping>>;
    async fn all_mappings(&self) -> Result<Vec<Mapping>>;
    /// Deletes the mapping and all of its offers.
    async fn delete_mapping(&self, id: &str) -> Result<()>;

    // --- offers ("options") ---
    async fn upsert_offer(&self, offer: Offer) -> Result<()>;
    async fn get_offer(&self, id: &str) -> Result<Option<Offer>>;
    async fn offers_for_mapping(&self, mapping_id: &str) -> Result<Vec<Offer>>;
    /// Applies a partial update and stamps `updated_at`. A manual switch to
    /// `active` clears `deactivated_reason`.
    async fn update_offer(&self, id: &str, patch: OfferPatch) -> Result<Offer>;
    async fn delete_offer(&self, id: &str) -> Result<()>;
    /// The single offer the resolver should serve for a mapping. When more
    /// than one offer is active, the most recently updated one wins.
    async fn active_offer(&self, mapping_id: &str) -> Result<Option<Offer>>;
    /// Every active offer across all mappings. Prober input only.
    async fn all_active_offers(&self) -> Result<Vec<Offer>>;
    /// Flips an offer inactive and records why. Only ever transitions
    /// active -> inactive; inactive offers are left untouched.
    async fn deactivate_offer(&self, id: &str, reason: &str) -> Result<()>;

    // --- clicks ---
    async fn record_click(&self, click: Click) -> Result<()>;
    async fn clicks_for_mapping(&self, mapping_id: &str, limit: u64) -> Result<Vec<Click>>;

    // --- suppliers ---
    async fn all_suppliers(&self) -> Result<Vec<Supplier>>;
    async fn upsert_supplier(&self, supplier: Supplier) -> Result<()>;

    // --- health ---
    async fn ping(&self) -> Result<()>;
    async fn get_backend_info(&self) -> StorageInfo;
}

/// Seeds the supplier reference table on first boot. Does nothing when any
/// supplier already exists. Returns the number of suppliers inserted.
pub async fn ensure_default_suppliers(storage: &dyn Storage) -> Result<usize> {
    if !storage.all_suppliers().await?.is_empty() {
        return Ok(0);
    }

    let defaults = default_suppliers();
    let count = defaults.len();
    for supplier in defaults {
        storage.upsert_supplier(supplier).await?;
    }
    Ok(count)
}

fn default_suppliers() -> Vec<Supplier> {
    let now = Utc::now();
    [
        ("amazon", "Amazon", "https://www.amazon.de"),
        ("rewe", "REWE", "https://shop.rewe.de"),
        ("edeka24", "EDEKA24", "https://www.edeka24.de"),
        ("bringmeister", "Bringmeister", "https://www.bringmeister.de"),
    ]
    .iter()
    .map(|(id, name, url)| Supplier {
        id: id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        active: true,
        created_at: now,
    })
    .collect()
}

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else if database_url == "memory://" {
        Ok("memory".to_string())
    } else {
        Err(BuylinkError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://, memory://",
            database_url
        )))
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
        let database_url = &config.database_url;
        let backend_type = infer_backend_from_url(database_url)?;

        let storage: Arc<dyn Storage> = if backend_type == "memory" {
            Arc::new(MemoryStorage::new())
        } else {
            Arc::new(SeaOrmStorage::new(database_url, &backend_type).await?)
        };
        Ok(storage)
    }
}
