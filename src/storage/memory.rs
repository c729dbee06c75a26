//! In-memory storage backend
//!
//! Keeps everything in `DashMap`s. Used by the test suite and selectable
//! with `DATABASE_URL=memory://` for throwaway setups. Per-entry atomicity
//! comes from the map's sharded locking; there is no durability.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::models::{Click, Mapping, Offer, OfferPatch, OfferStatus, StorageInfo, Supplier};
use super::Storage;
use crate::errors::{BuylinkError, Result};

#[derive(Default)]
pub struct MemoryStorage {
    mappings: DashMap<String, Mapping>,
    offers: DashMap<String, Offer>,
    clicks: DashMap<String, Click>,
    suppliers: DashMap<String, Supplier>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upsert_mapping(&self, mapping: Mapping) -> Result<()> {
        self.mappings.insert(mapping.id.clone(), mapping);
        Ok(())
    }

    async fn get_mapping(&self, id: &str) -> Result<Option<Mapping>> {
        Ok(self.mappings.get(id).map(|m| m.clone()))
    }

    async fn all_mappings(&self) -> Result<Vec<Mapping>> {
        Ok(self.mappings.iter().map(|m| m.clone()).collect())
    }

    async fn delete_mapping(&self, id: &str) -> Result<()> {
        if self.mappings.remove(id).is_none() {
            return Err(BuylinkError::not_found(format!("Mapping not found: {}", id)));
        }
        self.offers.retain(|_, offer| offer.mapping_id != id);
        Ok(())
    }

    async fn upsert_offer(&self, offer: Offer) -> Result<()> {
        self.offers.insert(offer.id.clone(), offer);
        Ok(())
    }

    async fn get_offer(&self, id: &str) -> Result<Option<Offer>> {
        Ok(self.offers.get(id).map(|o| o.clone()))
    }

    async fn offers_for_mapping(&self, mapping_id: &str) -> Result<Vec<Offer>> {
        let mut offers: Vec<Offer> = self
            .offers
            .iter()
            .filter(|o| o.mapping_id == mapping_id)
            .map(|o| o.clone())
            .collect();
        offers.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(offers)
    }

    async fn update_offer(&self, id: &str, patch: OfferPatch) -> Result<Offer> {
        let mut entry = self
            .offers
            .get_mut(id)
            .ok_or_else(|| BuylinkError::not_found(format!("Option not found: {}", id)))?;

        if let Some(status) = patch.status {
            entry.status = status;
            if status == OfferStatus::Active {
                entry.deactivated_reason = None;
            }
        }
        if let Some(url) = patch.url {
            entry.url = url;
        }
        if let Some(title) = patch.title {
            entry.title = title;
        }
        if let Some(price) = patch.price_last_seen {
            entry.price_last_seen = Some(price);
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_offer(&self, id: &str) -> Result<()> {
        if self.offers.remove(id).is_none() {
            return Err(BuylinkError::not_found(format!("Option not found: {}", id)));
        }
        Ok(())
    }

    async fn active_offer(&self, mapping_id: &str) -> Result<Option<Offer>> {
        Ok(self
            .offers
            .iter()
            .filter(|o| o.mapping_id == mapping_id && o.is_active())
            .map(|o| o.clone())
            .max_by_key(|o| o.updated_at))
    }

    async fn all_active_offers(&self) -> Result<Vec<Offer>> {
        Ok(self
            .offers
            .iter()
            .filter(|o| o.is_active())
            .map(|o| o.clone())
            .collect())
    }

    async fn deactivate_offer(&self, id: &str, reason: &str) -> Result<()> {
        if let Some(mut entry) = self.offers.get_mut(id) {
            // active -> inactive only; re-runs of the prober are no-ops
            if entry.is_active() {
                entry.status = OfferStatus::Inactive;
                entry.deactivated_reason = Some(reason.to_string());
                entry.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn record_click(&self, click: Click) -> Result<()> {
        self.clicks.insert(click.id.clone(), click);
        Ok(())
    }

    async fn clicks_for_mapping(&self, mapping_id: &str, limit: u64) -> Result<Vec<Click>> {
        let mut clicks: Vec<Click> = self
            .clicks
            .iter()
            .filter(|c| c.mapping_id == mapping_id)
            .map(|c| c.clone())
            .collect();
        clicks.sort_by(|a, b| b.ts.cmp(&a.ts));
        clicks.truncate(limit as usize);
        Ok(clicks)
    }

    async fn all_suppliers(&self) -> Result<Vec<Supplier>> {
        let mut suppliers: Vec<Supplier> = self.suppliers.iter().map(|s| s.clone()).collect();
        suppliers.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(suppliers)
    }

    async fn upsert_supplier(&self, supplier: Supplier) -> Result<()> {
        self.suppliers.insert(supplier.id.clone(), supplier);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get_backend_info(&self) -> StorageInfo {
        StorageInfo {
            backend: "memory".to_string(),
        }
    }
}
