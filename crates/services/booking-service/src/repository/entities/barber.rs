//! Barber database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Barber;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "barbers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub external_staff_ref: Option<String>,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Barber {
    fn from(model: Model) -> Self {
        Barber {
            id: model.id,
            shop_id: model.shop_id,
            name: model.name,
            external_staff_ref: model.external_staff_ref,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
