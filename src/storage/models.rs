use serde::{Deserialize, Serialize};

use crate::errors::{BuylinkError, Result};

/// A logical "thing to buy", addressed by a stable external id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Mapping {
    pub id: String,
    pub name: String,
    pub ean: Option<String>,
    pub keywords: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Active,
    Inactive,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Active => "active",
            OfferStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(OfferStatus::Active),
            "inactive" => Ok(OfferStatus::Inactive),
            other => Err(BuylinkError::validation(format!(
                "Unknown option status: {}. Supported: active, inactive",
                other
            ))),
        }
    }
}

/// One supplier's outbound purchase URL for a mapping. The admin API and the
/// database call this an "option"; the Rust name avoids the std clash.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Offer {
    pub id: String,
    pub mapping_id: String,
    pub supplier: String,
    pub title: String,
    pub url: String,
    pub status: OfferStatus,
    pub price_last_seen: Option<f64>,
    /// Set by the link-health prober when it flips the offer inactive,
    /// cleared again on manual reactivation.
    pub deactivated_reason: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Offer {
    pub fn is_active(&self) -> bool {
        self.status == OfferStatus::Active
    }
}

/// Partial update for an offer. `None` fields are left untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct OfferPatch {
    pub status: Option<OfferStatus>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub price_last_seen: Option<f64>,
}

/// Append-only audit record of one redirect attempt. Deliberately not linked
/// to the offer that was served: it records the intent to redirect for a
/// mapping, not the resolved target.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Click {
    pub id: String,
    pub mapping_id: String,
    pub ts: chrono::DateTime<chrono::Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// A known outbound retailer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub url: String,
    pub active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageInfo {
    pub backend: String,
}
