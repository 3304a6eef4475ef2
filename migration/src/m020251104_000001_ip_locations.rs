use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the ip_locations table
        manager
            .create_table(
                Table::create()
                    .table(IpLocation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IpLocation::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IpLocation::Ip).string().not_null())
                    .col(ColumnDef::new(IpLocation::City).string().not_null())
                    .col(ColumnDef::new(IpLocation::Region).string().not_null())
                    .col(ColumnDef::new(IpLocation::Country).string().not_null())
                    .col(ColumnDef::new(IpLocation::CountryCode).string().not_null())
                    .col(ColumnDef::new(IpLocation::Continent).string().not_null())
                    .col(ColumnDef::new(IpLocation::Latitude).string().not_null())
                    .col(ColumnDef::new(IpLocation::Longitude).string().not_null())
                    .col(
                        ColumnDef::new(IpLocation::LastUpdated)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(IpLocation::UpdatedBy).string().null())
                    .to_owned(),
            )
            .await?;

        // Unique index on ip; id is the hash of ip, the two map one-to-one
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ip_address")
                    .table(IpLocation::Table)
                    .col(IpLocation::Ip)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index on the refresh timestamp
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_last_updated")
                    .table(IpLocation::Table)
                    .col(IpLocation::LastUpdated)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop indexes
        manager
            .drop_index(Index::drop().name("idx_last_updated").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_ip_address").to_owned())
            .await?;

        // Drop the table
        manager
            .drop_table(Table::drop().table(IpLocation::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum IpLocation {
    #[sea_orm(iden = "ip_locations")]
    Table,
    Id,
    Ip,
    City,
    Region,
    Country,
    CountryCode,
    Continent,
    Latitude,
    Longitude,
    LastUpdated,
    UpdatedBy,
}
