//! Redirect resolution
//!
//! Picks the option to serve for a mapping and turns its URL into the final
//! redirect target. Resolution is a read plus a deterministic transformation;
//! it never mutates state and always produces a usable URL — worst case the
//! configured fallback category page.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{AffiliateMode, AppConfig, RedirectConfig};
use crate::storage::Storage;
use crate::utils::transform_outbound;

pub struct Resolver {
    storage: Arc<dyn Storage>,
    redirect: RedirectConfig,
    affiliate: AffiliateMode,
}

impl Resolver {
    pub fn new(storage: Arc<dyn Storage>, config: &AppConfig) -> Self {
        Resolver {
            storage,
            redirect: config.redirect.clone(),
            affiliate: config.affiliate.clone(),
        }
    }

    pub fn with_parts(
        storage: Arc<dyn Storage>,
        redirect: RedirectConfig,
        affiliate: AffiliateMode,
    ) -> Self {
        Resolver {
            storage,
            redirect,
            affiliate,
        }
    }

    /// Resolves a mapping id to the outbound URL to redirect to.
    ///
    /// Unknown mappings and storage failures both degrade to the fallback
    /// URL; the caller never has to handle an error here. The fallback gets
    /// the same affiliate/UTM treatment as a real option URL.
    pub async fn resolve(&self, mapping_id: &str) -> String {
        let base = match self.storage.active_offer(mapping_id).await {
            Ok(Some(offer)) => {
                debug!(
                    "Resolved mapping {} to option {} ({})",
                    mapping_id, offer.id, offer.supplier
                );
                offer.url
            }
            Ok(None) => {
                debug!("No active option for mapping {}, using fallback", mapping_id);
                self.redirect.fallback_url.clone()
            }
            Err(e) => {
                warn!(
                    "Storage read failed while resolving {}: {}, using fallback",
                    mapping_id, e
                );
                self.redirect.fallback_url.clone()
            }
        };

        transform_outbound(&base, &self.affiliate, &self.redirect)
    }
}
