//! Migration: appointments and payment records.

use sea_orm_migration::prelude::*;

use super::m20240601_000001_create_catalog_tables::{
    timestamp, Barbers, Customers, Services, Shops,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Appointments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Appointments::ShopId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::BarberId).uuid().null())
                    .col(ColumnDef::new(Appointments::ServiceId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::CustomerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Appointments::StartAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::EndAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Appointments::Status).string().not_null())
                    .col(
                        ColumnDef::new(Appointments::ExternalBookingRef)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(timestamp(Appointments::CreatedAt))
                    .col(timestamp(Appointments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_shop_id")
                            .from(Appointments::Table, Appointments::ShopId)
                            .to(Shops::Table, Shops::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_barber_id")
                            .from(Appointments::Table, Appointments::BarberId)
                            .to(Barbers::Table, Barbers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_service_id")
                            .from(Appointments::Table, Appointments::ServiceId)
                            .to(Services::Table, Services::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_customer_id")
                            .from(Appointments::Table, Appointments::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_shop_start")
                    .table(Appointments::Table)
                    .col(Appointments::ShopId)
                    .col(Appointments::StartAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PaymentRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaymentRecords::AppointmentId).uuid().null())
                    .col(ColumnDef::new(PaymentRecords::CustomerId).uuid().not_null())
                    .col(
                        ColumnDef::new(PaymentRecords::ExternalPaymentRef)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentRecords::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentRecords::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(PaymentRecords::Status).string().not_null())
                    .col(timestamp(PaymentRecords::CreatedAt))
                    .col(timestamp(PaymentRecords::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_records_appointment_id")
                            .from(PaymentRecords::Table, PaymentRecords::AppointmentId)
                            .to(Appointments::Table, Appointments::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_records_customer_id")
                            .from(PaymentRecords::Table, PaymentRecords::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payment_records_appointment_id")
                    .table(PaymentRecords::Table)
                    .col(PaymentRecords::AppointmentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentRecords::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Appointments::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum Appointments {
    Table,
    Id,
    ShopId,
    BarberId,
    ServiceId,
    CustomerId,
    StartAt,
    EndAt,
    Status,
    ExternalBookingRef,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PaymentRecords {
    Table,
    Id,
    AppointmentId,
    CustomerId,
    ExternalPaymentRef,
    AmountCents,
    Currency,
    Status,
    CreatedAt,
    UpdatedAt,
}
