//! Offer entity: one supplier's outbound purchase URL for a mapping
//!
//! The table keeps the historical name `options`; the admin API speaks of
//! "options" as well. `status` holds "active" or "inactive" as text.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "options")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub mapping_id: String,
    pub supplier: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub status: String,
    pub price_last_seen: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub deactivated_reason: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mapping::Entity",
        from = "Column::MappingId",
        to = "super::mapping::Column::Id"
    )]
    Mapping,
}

impl Related<super::mapping::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mapping.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
