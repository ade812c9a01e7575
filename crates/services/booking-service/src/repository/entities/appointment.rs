//! Appointment database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{Appointment, AppointmentStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub barber_id: Option<Uuid>,
    pub service_id: Uuid,
    pub customer_id: Uuid,
    pub start_at: DateTimeUtc,
    pub end_at: DateTimeUtc,
    pub status: String,
    #[sea_orm(unique)]
    pub external_booking_ref: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Appointment {
    fn from(model: Model) -> Self {
        Appointment {
            id: model.id,
            shop_id: model.shop_id,
            barber_id: model.barber_id,
            service_id: model.service_id,
            customer_id: model.customer_id,
            start_at: model.start_at,
            end_at: model.end_at,
            status: AppointmentStatus::from(model.status.as_str()),
            external_booking_ref: model.external_booking_ref,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
