//! Payment record database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{PaymentRecord, PaymentStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub customer_id: Uuid,
    #[sea_orm(unique)]
    pub external_payment_ref: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PaymentRecord {
    fn from(model: Model) -> Self {
        PaymentRecord {
            id: model.id,
            appointment_id: model.appointment_id,
            customer_id: model.customer_id,
            external_payment_ref: model.external_payment_ref,
            amount_cents: model.amount_cents,
            currency: model.currency,
            status: PaymentStatus::from(model.status.as_str()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
