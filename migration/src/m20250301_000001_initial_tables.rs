use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Mapping::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Mapping::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Mapping::Name).string().not_null())
                    .col(ColumnDef::new(Mapping::Ean).string().null())
                    .col(ColumnDef::new(Mapping::Keywords).text().null())
                    .col(
                        ColumnDef::new(Mapping::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Mapping::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Offer::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Offer::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Offer::MappingId).string().not_null())
                    .col(ColumnDef::new(Offer::Supplier).string().not_null())
                    .col(ColumnDef::new(Offer::Title).string().not_null())
                    .col(ColumnDef::new(Offer::Url).text().not_null())
                    .col(
                        ColumnDef::new(Offer::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Offer::PriceLastSeen).double().null())
                    .col(
                        ColumnDef::new(Offer::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_options_mapping_id")
                    .table(Offer::Table)
                    .col(Offer::MappingId)
                    .to_owned(),
            )
            .await?;

        // Covers the prober's "all active" scan and the resolver's lookup
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_options_status_mapping")
                    .table(Offer::Table)
                    .col(Offer::Status)
                    .col(Offer::MappingId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Click::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Click::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Click::MappingId).string().not_null())
                    .col(
                        ColumnDef::new(Click::Ts)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Click::UserAgent).text().null())
                    .col(ColumnDef::new(Click::Referer).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_mapping_ts")
                    .table(Click::Table)
                    .col(Click::MappingId)
                    .col(Click::Ts)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Supplier::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Supplier::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Supplier::Name).string().not_null())
                    .col(ColumnDef::new(Supplier::Url).text().not_null())
                    .col(
                        ColumnDef::new(Supplier::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Supplier::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Supplier::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Click::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Offer::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Mapping::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Mapping {
    #[sea_orm(iden = "mappings")]
    Table,
    Id,
    Name,
    Ean,
    Keywords,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Offer {
    #[sea_orm(iden = "options")]
    Table,
    Id,
    MappingId,
    Supplier,
    Title,
    Url,
    Status,
    PriceLastSeen,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Click {
    #[sea_orm(iden = "clicks")]
    Table,
    Id,
    MappingId,
    Ts,
    UserAgent,
    Referer,
}

#[derive(DeriveIden)]
enum Supplier {
    #[sea_orm(iden = "suppliers")]
    Table,
    Id,
    Name,
    Url,
    Active,
    CreatedAt,
}
