//! Link health probing
//!
//! Batch job that checks every active option's outbound URL and turns dead
//! ones off. Probes run concurrently but bounded, each with its own
//! timeout, and one bad host never aborts the rest of the batch. The
//! operation is monotonic: it only ever flips active -> inactive, and
//! re-running it is free because inactive options are not fetched at all.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::storage::Storage;

#[derive(Clone, Debug, PartialEq)]
pub enum ProbeOutcome {
    /// Target answered with a non-error status.
    Healthy(u16),
    /// Target is considered dead; the string is the human-readable reason
    /// that ends up on the option record.
    Dead(String),
}

/// Seam for the outbound existence check, so the batch logic is testable
/// without a network.
#[async_trait]
pub trait LinkProbe: Send + Sync {
    async fn check(&self, url: &str) -> ProbeOutcome;
}

/// Real probe: HEAD with a short timeout, falling back to GET for targets
/// that reject HEAD outright.
pub struct HttpProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("buylink-linkcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpProbe { client, timeout })
    }

    fn describe_error(&self, e: &reqwest::Error) -> String {
        if e.is_timeout() {
            format!("timeout after {}s", self.timeout.as_secs())
        } else if e.is_connect() {
            format!("connection failed: {}", e)
        } else {
            e.to_string()
        }
    }
}

fn classify_status(status: reqwest::StatusCode) -> ProbeOutcome {
    if status.as_u16() >= 400 {
        ProbeOutcome::Dead(format!("HTTP error {}", status.as_u16()))
    } else {
        ProbeOutcome::Healthy(status.as_u16())
    }
}

#[async_trait]
impl LinkProbe for HttpProbe {
    async fn check(&self, url: &str) -> ProbeOutcome {
        match self.client.head(url).send().await {
            Ok(resp) => {
                let status = resp.status();
                // Some shops answer HEAD with 405/501 while GET works fine.
                if status == reqwest::StatusCode::METHOD_NOT_ALLOWED
                    || status == reqwest::StatusCode::NOT_IMPLEMENTED
                {
                    debug!("HEAD not supported by {}, retrying with GET", url);
                    return match self.client.get(url).send().await {
                        Ok(resp) => classify_status(resp.status()),
                        Err(e) => ProbeOutcome::Dead(self.describe_error(&e)),
                    };
                }
                classify_status(status)
            }
            Err(e) => ProbeOutcome::Dead(self.describe_error(&e)),
        }
    }
}

/// One option the prober just turned off.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DeactivatedOffer {
    pub option_id: String,
    pub url: String,
    pub reason: String,
}

pub struct LinkHealthService {
    storage: Arc<dyn Storage>,
    probe: Arc<dyn LinkProbe>,
    concurrency: usize,
}

impl LinkHealthService {
    pub fn new(storage: Arc<dyn Storage>, probe: Arc<dyn LinkProbe>, concurrency: usize) -> Self {
        LinkHealthService {
            storage,
            probe,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(storage: Arc<dyn Storage>, config: &AppConfig) -> Result<Self> {
        let probe = HttpProbe::new(Duration::from_secs(config.probe.timeout_secs))?;
        Ok(Self::new(storage, Arc::new(probe), config.probe.concurrency))
    }

    /// Probes every active option and deactivates the dead ones, returning
    /// the full list of changes for the admin report. Writes that fail are
    /// logged and skipped; partial progress stands, there is no rollback.
    pub async fn probe_all(&self) -> Result<Vec<DeactivatedOffer>> {
        let offers = self.storage.all_active_offers().await?;
        let total = offers.len();
        debug!("Link health run starting, {} active options", total);

        let results: Vec<_> = stream::iter(offers.into_iter().map(|offer| {
            let probe = Arc::clone(&self.probe);
            async move {
                let outcome = probe.check(&offer.url).await;
                (offer, outcome)
            }
        }))
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        let mut changed = Vec::new();
        for (offer, outcome) in results {
            if let ProbeOutcome::Dead(reason) = outcome {
                match self.storage.deactivate_offer(&offer.id, &reason).await {
                    Ok(()) => {
                        info!("Option {} deactivated: {}", offer.id, reason);
                        changed.push(DeactivatedOffer {
                            option_id: offer.id,
                            url: offer.url,
                            reason,
                        });
                    }
                    Err(e) => {
                        warn!("Deactivating option {} failed: {}", offer.id, e);
                    }
                }
            }
        }

        info!(
            "Link health run finished: {} probed, {} deactivated",
            total,
            changed.len()
        );
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_below_400_is_healthy() {
        assert_eq!(
            classify_status(reqwest::StatusCode::OK),
            ProbeOutcome::Healthy(200)
        );
        // 399 is the last healthy code
        assert_eq!(
            classify_status(reqwest::StatusCode::from_u16(399).unwrap()),
            ProbeOutcome::Healthy(399)
        );
    }

    #[test]
    fn status_400_and_up_is_dead_with_reason() {
        assert_eq!(
            classify_status(reqwest::StatusCode::BAD_REQUEST),
            ProbeOutcome::Dead("HTTP error 400".to_string())
        );
        assert_eq!(
            classify_status(reqwest::StatusCode::GONE),
            ProbeOutcome::Dead("HTTP error 410".to_string())
        );
        assert_eq!(
            classify_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            ProbeOutcome::Dead("HTTP error 500".to_string())
        );
    }

    #[test]
    fn shop_redirects_count_as_alive() {
        // consent/region bounces are 3xx and must not kill the option
        assert_eq!(
            classify_status(reqwest::StatusCode::FOUND),
            ProbeOutcome::Healthy(302)
        );
    }
}
