//! Migration: shops, services, barbers and customers.

use sea_orm_migration::prelude::*;

use domain::MIN_SERVICE_DURATION_MINUTES;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shops::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shops::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Shops::Name).string().not_null())
                    .col(ColumnDef::new(Shops::ExternalLocationRef).string().null())
                    .col(ColumnDef::new(Shops::OwnerId).uuid().not_null())
                    .col(timestamp(Shops::CreatedAt))
                    .col(timestamp(Shops::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Services::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Services::ShopId).uuid().not_null())
                    .col(ColumnDef::new(Services::Name).string().not_null())
                    .col(
                        ColumnDef::new(Services::DurationMinutes)
                            .integer()
                            .not_null()
                            .check(
                                Expr::col(Services::DurationMinutes)
                                    .gte(MIN_SERVICE_DURATION_MINUTES),
                            ),
                    )
                    .col(
                        ColumnDef::new(Services::PriceCents)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Services::PriceCents).gte(0)),
                    )
                    .col(ColumnDef::new(Services::ExternalCatalogRef).string().null())
                    .col(timestamp(Services::CreatedAt))
                    .col(timestamp(Services::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_services_shop_id")
                            .from(Services::Table, Services::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Barbers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Barbers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Barbers::ShopId).uuid().not_null())
                    .col(ColumnDef::new(Barbers::Name).string().not_null())
                    .col(ColumnDef::new(Barbers::ExternalStaffRef).string().null())
                    .col(
                        ColumnDef::new(Barbers::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(Barbers::CreatedAt))
                    .col(timestamp(Barbers::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_barbers_shop_id")
                            .from(Barbers::Table, Barbers::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Reverse lookup of provider staff members
        manager
            .create_index(
                Index::create()
                    .name("idx_barbers_shop_staff_ref")
                    .table(Barbers::Table)
                    .col(Barbers::ShopId)
                    .col(Barbers::ExternalStaffRef)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Customers::ShopId).uuid().not_null())
                    .col(ColumnDef::new(Customers::FirstName).string().not_null())
                    .col(ColumnDef::new(Customers::LastName).string().not_null())
                    .col(ColumnDef::new(Customers::Phone).string().not_null())
                    .col(ColumnDef::new(Customers::Email).string().null())
                    .col(ColumnDef::new(Customers::ExternalCustomerRef).string().null())
                    .col(timestamp(Customers::CreatedAt))
                    .col(timestamp(Customers::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customers_shop_id")
                            .from(Customers::Table, Customers::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Not unique: concurrent first bookings may race to a duplicate row
        manager
            .create_index(
                Index::create()
                    .name("idx_customers_shop_phone")
                    .table(Customers::Table)
                    .col(Customers::ShopId)
                    .col(Customers::Phone)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Customers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Barbers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Services::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Shops::Table).if_exists().to_owned())
            .await
    }
}

pub(super) fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
pub(super) enum Shops {
    Table,
    Id,
    Name,
    ExternalLocationRef,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(super) enum Services {
    Table,
    Id,
    ShopId,
    Name,
    DurationMinutes,
    PriceCents,
    ExternalCatalogRef,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(super) enum Barbers {
    Table,
    Id,
    ShopId,
    Name,
    ExternalStaffRef,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(super) enum Customers {
    Table,
    Id,
    ShopId,
    FirstName,
    LastName,
    Phone,
    Email,
    ExternalCustomerRef,
    CreatedAt,
    UpdatedAt,
}
