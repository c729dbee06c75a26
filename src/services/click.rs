//! Click recording
//!
//! Appends one immutable click record per redirect attempt. The record
//! captures intent (the mapping id) plus whatever the browser sent along;
//! it is deliberately not linked to the option that ends up being served.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::Result;
use crate::storage::{Click, Storage};

pub struct ClickRecorder {
    storage: Arc<dyn Storage>,
}

impl ClickRecorder {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        ClickRecorder { storage }
    }

    pub async fn record(
        &self,
        mapping_id: &str,
        user_agent: Option<String>,
        referer: Option<String>,
    ) -> Result<Click> {
        let click = Click {
            id: Uuid::new_v4().to_string(),
            mapping_id: mapping_id.to_string(),
            ts: Utc::now(),
            user_agent,
            referer,
        };
        self.storage.record_click(click.clone()).await?;
        Ok(click)
    }
}
