//! Service catalog database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Service;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub external_catalog_ref: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Service {
    fn from(model: Model) -> Self {
        Service {
            id: model.id,
            shop_id: model.shop_id,
            name: model.name,
            duration_minutes: model.duration_minutes,
            price_cents: model.price_cents,
            external_catalog_ref: model.external_catalog_ref,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
