//! Adds `deactivated_reason` so the link-health prober can record why an
//! option was turned off.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Offer::Table)
                    .add_column(ColumnDef::new(Offer::DeactivatedReason).text().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Offer::Table)
                    .drop_column(Offer::DeactivatedReason)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Offer {
    #[sea_orm(iden = "options")]
    Table,
    DeactivatedReason,
}
