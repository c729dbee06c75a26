//! SeaORM storage backend
//!
//! Database storage over SQLite, MySQL/MariaDB and PostgreSQL. Migrations
//! run automatically on startup.

mod connection;
mod converters;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::info;

use super::models::{Click, Mapping, Offer, OfferPatch, OfferStatus, StorageInfo, Supplier};
use super::Storage;
use crate::errors::{BuylinkError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
use converters::{
    click_to_active_model, mapping_to_active_model, model_to_click, model_to_mapping,
    model_to_offer, model_to_supplier, offer_to_active_model, supplier_to_active_model,
};
use migration::entities::{click, mapping, offer, supplier};

pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(BuylinkError::database_config("DATABASE_URL is not set"));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name).await?
        };

        run_migrations(&db).await?;

        info!("{} storage initialized", backend_name.to_uppercase());
        Ok(SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
        })
    }

    /// 获取数据库连接（测试和迁移工具使用）
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn upsert_mapping(&self, m: Mapping) -> Result<()> {
        mapping::Entity::insert(mapping_to_active_model(&m))
            .on_conflict(
                OnConflict::column(mapping::Column::Id)
                    .update_columns([
                        mapping::Column::Name,
                        mapping::Column::Ean,
                        mapping::Column::Keywords,
                        mapping::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| {
                BuylinkError::database_operation(format!("Upsert mapping '{}' failed: {}", m.id, e))
            })?;

        info!("Mapping upserted: {}", m.id);
        Ok(())
    }

    async fn get_mapping(&self, id: &str) -> Result<Option<Mapping>> {
        let model = mapping::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_mapping))
    }

    async fn all_mappings(&self) -> Result<Vec<Mapping>> {
        let models = mapping::Entity::find()
            .order_by_asc(mapping::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_mapping).collect())
    }

    async fn delete_mapping(&self, id: &str) -> Result<()> {
        // Cascade: the options belonging to the mapping go with it.
        offer::Entity::delete_many()
            .filter(offer::Column::MappingId.eq(id))
            .exec(&self.db)
            .await?;

        let result = mapping::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(BuylinkError::not_found(format!("Mapping not found: {}", id)));
        }

        info!("Mapping deleted: {}", id);
        Ok(())
    }

    async fn upsert_offer(&self, o: Offer) -> Result<()> {
        offer::Entity::insert(offer_to_active_model(&o))
            .on_conflict(
                OnConflict::column(offer::Column::Id)
                    .update_columns([
                        offer::Column::MappingId,
                        offer::Column::Supplier,
                        offer::Column::Title,
                        offer::Column::Url,
                        offer::Column::Status,
                        offer::Column::PriceLastSeen,
                        offer::Column::DeactivatedReason,
                        offer::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| {
                BuylinkError::database_operation(format!("Upsert option '{}' failed: {}", o.id, e))
            })?;
        Ok(())
    }

    async fn get_offer(&self, id: &str) -> Result<Option<Offer>> {
        let model = offer::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_offer))
    }

    async fn offers_for_mapping(&self, mapping_id: &str) -> Result<Vec<Offer>> {
        let models = offer::Entity::find()
            .filter(offer::Column::MappingId.eq(mapping_id))
            .order_by_desc(offer::Column::UpdatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_offer).collect())
    }

    async fn update_offer(&self, id: &str, patch: OfferPatch) -> Result<Offer> {
        let model = offer::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| BuylinkError::not_found(format!("Option not found: {}", id)))?;

        let mut o = model_to_offer(model);
        if let Some(status) = patch.status {
            o.status = status;
            if status == OfferStatus::Active {
                o.deactivated_reason = None;
            }
        }
        if let Some(url) = patch.url {
            o.url = url;
        }
        if let Some(title) = patch.title {
            o.title = title;
        }
        if let Some(price) = patch.price_last_seen {
            o.price_last_seen = Some(price);
        }
        o.updated_at = Utc::now();

        self.upsert_offer(o.clone()).await?;
        Ok(o)
    }

    async fn delete_offer(&self, id: &str) -> Result<()> {
        let result = offer::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(BuylinkError::not_found(format!("Option not found: {}", id)));
        }
        Ok(())
    }

    async fn active_offer(&self, mapping_id: &str) -> Result<Option<Offer>> {
        let model = offer::Entity::find()
            .filter(offer::Column::MappingId.eq(mapping_id))
            .filter(offer::Column::Status.eq(OfferStatus::Active.as_str()))
            .order_by_desc(offer::Column::UpdatedAt)
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_offer))
    }

    async fn all_active_offers(&self) -> Result<Vec<Offer>> {
        let models = offer::Entity::find()
            .filter(offer::Column::Status.eq(OfferStatus::Active.as_str()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_offer).collect())
    }

    async fn deactivate_offer(&self, id: &str, reason: &str) -> Result<()> {
        // Conditional update: only an active row changes, so the transition
        // stays monotonic even with concurrent prober runs.
        offer::Entity::update_many()
            .col_expr(
                offer::Column::Status,
                Expr::value(OfferStatus::Inactive.as_str()),
            )
            .col_expr(offer::Column::DeactivatedReason, Expr::value(reason))
            .col_expr(offer::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(offer::Column::Id.eq(id))
            .filter(offer::Column::Status.eq(OfferStatus::Active.as_str()))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn record_click(&self, c: Click) -> Result<()> {
        click::Entity::insert(click_to_active_model(&c))
            .exec(&self.db)
            .await
            .map_err(|e| {
                BuylinkError::database_operation(format!(
                    "Recording click for mapping '{}' failed: {}",
                    c.mapping_id, e
                ))
            })?;
        Ok(())
    }

    async fn clicks_for_mapping(&self, mapping_id: &str, limit: u64) -> Result<Vec<Click>> {
        let models = click::Entity::find()
            .filter(click::Column::MappingId.eq(mapping_id))
            .order_by_desc(click::Column::Ts)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_click).collect())
    }

    async fn all_suppliers(&self) -> Result<Vec<Supplier>> {
        let models = supplier::Entity::find()
            .order_by_asc(supplier::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_supplier).collect())
    }

    async fn upsert_supplier(&self, s: Supplier) -> Result<()> {
        supplier::Entity::insert(supplier_to_active_model(&s))
            .on_conflict(
                OnConflict::column(supplier::Column::Id)
                    .update_columns([
                        supplier::Column::Name,
                        supplier::Column::Url,
                        supplier::Column::Active,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| BuylinkError::database_connection(format!("Storage ping failed: {}", e)))
    }

    async fn get_backend_info(&self) -> StorageInfo {
        StorageInfo {
            backend: self.backend_name.clone(),
        }
    }
}
