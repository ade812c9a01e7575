//! Shop/service/barber loading shared by availability and booking.

use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{Barber, Service, Shop};

use crate::repository::EntityStore;

/// Provider references needed to talk about one shop/service/barber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRefs {
    pub location_ref: String,
    pub service_ref: String,
    pub staff_ref: Option<String>,
}

/// Validated shop, service and optional barber.
#[derive(Debug, Clone)]
pub struct BookingTarget {
    pub shop: Shop,
    pub service: Service,
    pub barber: Option<Barber>,
    pub refs: ProviderRefs,
}

/// Load and cross-check the entities a request refers to.
///
/// The three lookups run concurrently. Fails with `NotFound` for a missing
/// entity and `InvalidRequest` for a shop mismatch or a missing provider
/// reference. Nothing is written.
pub async fn load_target(
    store: &dyn EntityStore,
    shop_id: Uuid,
    service_id: Uuid,
    barber_id: Option<Uuid>,
) -> AppResult<BookingTarget> {
    let barber_lookup = async {
        match barber_id {
            Some(id) => store.find_barber(id).await,
            None => Ok(None),
        }
    };

    let (shop, service, barber) = tokio::try_join!(
        store.find_shop(shop_id),
        store.find_service(service_id),
        barber_lookup
    )?;

    let shop = shop.ok_or_not_found("Shop")?;
    let service = service.ok_or_not_found("Service")?;
    let barber = match barber_id {
        Some(_) => Some(barber.ok_or_not_found("Barber")?),
        None => None,
    };

    if !service.belongs_to(shop_id) {
        return Err(AppError::invalid_request(
            "Service does not belong to this shop",
        ));
    }
    if let Some(barber) = &barber {
        if !barber.belongs_to(shop_id) {
            return Err(AppError::invalid_request(
                "Barber does not belong to this shop",
            ));
        }
    }

    let refs = ProviderRefs {
        service_ref: service.catalog_ref()?.to_string(),
        location_ref: shop.location_ref()?.to_string(),
        staff_ref: barber
            .as_ref()
            .map(|b| b.staff_ref().map(str::to_string))
            .transpose()?,
    };

    Ok(BookingTarget {
        shop,
        service,
        barber,
        refs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockEntityStore;
    use chrono::Utc;

    fn shop(id: Uuid, location: Option<&str>) -> Shop {
        Shop {
            id,
            name: "Fade Factory".into(),
            external_location_ref: location.map(str::to_string),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(shop_id: Uuid) -> Service {
        Service {
            id: Uuid::new_v4(),
            shop_id,
            name: "Haircut".into(),
            duration_minutes: 30,
            price_cents: 3000,
            external_catalog_ref: Some("svc-1".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn barber(shop_id: Uuid, active: bool) -> Barber {
        Barber {
            id: Uuid::new_v4(),
            shop_id,
            name: "Sam".into(),
            external_staff_ref: Some("tm-1".into()),
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn store_with(shop: Option<Shop>, svc: Option<Service>, barber: Option<Barber>) -> MockEntityStore {
        let mut store = MockEntityStore::new();
        store.expect_find_shop().return_once(move |_| Ok(shop));
        store.expect_find_service().return_once(move |_| Ok(svc));
        store.expect_find_barber().return_once(move |_| Ok(barber));
        store
    }

    #[tokio::test]
    async fn missing_barber_is_not_found() {
        let shop_id = Uuid::new_v4();
        let store = store_with(Some(shop(shop_id, Some("loc-1"))), Some(service(shop_id)), None);

        let err = load_target(&store, shop_id, Uuid::new_v4(), Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(entity) if entity == "Barber"));
    }

    #[tokio::test]
    async fn barber_from_another_shop_is_rejected() {
        let shop_id = Uuid::new_v4();
        let store = store_with(
            Some(shop(shop_id, Some("loc-1"))),
            Some(service(shop_id)),
            Some(barber(Uuid::new_v4(), true)),
        );

        let err = load_target(&store, shop_id, Uuid::new_v4(), Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn inactive_barber_is_rejected() {
        let shop_id = Uuid::new_v4();
        let store = store_with(
            Some(shop(shop_id, Some("loc-1"))),
            Some(service(shop_id)),
            Some(barber(shop_id, false)),
        );

        let err = load_target(&store, shop_id, Uuid::new_v4(), Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn resolves_provider_refs() {
        let shop_id = Uuid::new_v4();
        let store = store_with(
            Some(shop(shop_id, Some("loc-1"))),
            Some(service(shop_id)),
            Some(barber(shop_id, true)),
        );

        let target = load_target(&store, shop_id, Uuid::new_v4(), Some(Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(
            target.refs,
            ProviderRefs {
                location_ref: "loc-1".into(),
                service_ref: "svc-1".into(),
                staff_ref: Some("tm-1".into()),
            }
        );
    }
}
