//! Shared test doubles
#![allow(dead_code)]

use async_trait::async_trait;

use buylink::errors::{BuylinkError, Result};
use buylink::storage::{
    Click, Mapping, MemoryStorage, Offer, OfferPatch, Storage, StorageInfo, Supplier,
};

/// Wraps the in-memory backend and fails selected operations, for testing
/// the degradation paths. Everything else delegates, so tests can seed and
/// inspect state through the same handle.
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_active_reads: bool,
    fail_click_writes: bool,
    fail_deactivation: bool,
}

impl FlakyStorage {
    pub fn new() -> Self {
        FlakyStorage {
            inner: MemoryStorage::new(),
            fail_active_reads: false,
            fail_click_writes: false,
            fail_deactivation: false,
        }
    }

    /// `active_offer` / `all_active_offers` return an error.
    pub fn failing_active_reads(mut self) -> Self {
        self.fail_active_reads = true;
        self
    }

    /// `record_click` returns an error.
    pub fn failing_click_writes(mut self) -> Self {
        self.fail_click_writes = true;
        self
    }

    /// `deactivate_offer` returns an error.
    pub fn failing_deactivation(mut self) -> Self {
        self.fail_deactivation = true;
        self
    }

    fn broken(&self, what: &str) -> BuylinkError {
        BuylinkError::database_operation(format!("simulated {} failure", what))
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn upsert_mapping(&self, mapping: Mapping) -> Result<()> {
        self.inner.upsert_mapping(mapping).await
    }

    async fn get_mapping(&self, id: &str) -> Result<Option<Mapping>> {
        self.inner.get_mapping(id).await
    }

    async fn all_mappings(&self) -> Result<Vec<Mapping>> {
        self.inner.all_mappings().await
    }

    async fn delete_mapping(&self, id: &str) -> Result<()> {
        self.inner.delete_mapping(id).await
    }

    async fn upsert_offer(&self, offer: Offer) -> Result<()> {
        self.inner.upsert_offer(offer).await
    }

    async fn get_offer(&self, id: &str) -> Result<Option<Offer>> {
        self.inner.get_offer(id).await
    }

    async fn offers_for_mapping(&self, mapping_id: &str) -> Result<Vec<Offer>> {
        self.inner.offers_for_mapping(mapping_id).await
    }

    async fn update_offer(&self, id: &str, patch: OfferPatch) -> Result<Offer> {
        self.inner.update_offer(id, patch).await
    }

    async fn delete_offer(&self, id: &str) -> Result<()> {
        self.inner.delete_offer(id).await
    }

    async fn active_offer(&self, mapping_id: &str) -> Result<Option<Offer>> {
        if self.fail_active_reads {
            return Err(self.broken("read"));
        }
        self.inner.active_offer(mapping_id).await
    }

    async fn all_active_offers(&self) -> Result<Vec<Offer>> {
        if self.fail_active_reads {
            return Err(self.broken("read"));
        }
        self.inner.all_active_offers().await
    }

    async fn deactivate_offer(&self, id: &str, reason: &str) -> Result<()> {
        if self.fail_deactivation {
            return Err(self.broken("deactivation"));
        }
        self.inner.deactivate_offer(id, reason).await
    }

    async fn record_click(&self, click: Click) -> Result<()> {
        if self.fail_click_writes {
            return Err(self.broken("click write"));
        }
        self.inner.record_click(click).await
    }

    async fn clicks_for_mapping(&self, mapping_id: &str, limit: u64) -> Result<Vec<Click>> {
        self.inner.clicks_for_mapping(mapping_id, limit).await
    }

    async fn all_suppliers(&self) -> Result<Vec<Supplier>> {
        self.inner.all_suppliers().await
    }

    async fn upsert_supplier(&self, supplier: Supplier) -> Result<()> {
        self.inner.upsert_supplier(supplier).await
    }

    async fn ping(&self) -> Result<()> {
        self.inner.ping().await
    }

    async fn get_backend_info(&self) -> StorageInfo {
        self.inner.get_backend_info().await
    }
}
