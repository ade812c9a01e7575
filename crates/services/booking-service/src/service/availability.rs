//! Availability resolution.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use common::{AppError, AppResult};
use domain::{AvailabilityQuery, AvailabilitySlot};

use super::catalog::load_target;
use crate::provider::{AvailabilitySearch, SchedulingProvider};
use crate::repository::EntityStore;

/// Availability service trait for dependency injection.
#[async_trait]
pub trait AvailabilityService: Send + Sync {
    /// Bookable slots for one day, ordered by start time.
    ///
    /// Computed fresh on every call. An empty list is a valid answer.
    async fn find_slots(&self, query: AvailabilityQuery) -> AppResult<Vec<AvailabilitySlot>>;
}

/// Resolves provider availability into shop-local slots.
pub struct AvailabilityResolver {
    store: Arc<dyn EntityStore>,
    provider: Arc<dyn SchedulingProvider>,
}

impl AvailabilityResolver {
    pub fn new(store: Arc<dyn EntityStore>, provider: Arc<dyn SchedulingProvider>) -> Self {
        Self { store, provider }
    }
}

#[async_trait]
impl AvailabilityService for AvailabilityResolver {
    async fn find_slots(&self, query: AvailabilityQuery) -> AppResult<Vec<AvailabilitySlot>> {
        let target = load_target(
            self.store.as_ref(),
            query.shop_id,
            query.service_id,
            query.barber_id,
        )
        .await?;

        let search = AvailabilitySearch {
            location_ref: target.refs.location_ref.clone(),
            service_ref: target.refs.service_ref.clone(),
            staff_ref: target.refs.staff_ref.clone(),
            date: query.date,
        };

        let records = self
            .provider
            .search_availability(search)
            .await
            .map_err(|e| {
                tracing::warn!(shop_id = %query.shop_id, error = %e, "Availability search failed");
                AppError::upstream(e.to_string())
            })?;

        // One batched reverse lookup for every staff member in the result
        let mut seen = HashSet::new();
        let staff_refs: Vec<String> = records
            .iter()
            .filter_map(|r| r.staff_ref.clone())
            .filter(|r| seen.insert(r.clone()))
            .collect();

        let mut barber_ids = HashMap::new();
        if !staff_refs.is_empty() {
            let barbers = self
                .store
                .find_barbers_by_staff_refs(query.shop_id, &staff_refs)
                .await?;
            for barber in barbers {
                if let Some(staff_ref) = barber.external_staff_ref {
                    barber_ids.entry(staff_ref).or_insert(barber.id);
                }
            }
        }

        let mut slots: Vec<AvailabilitySlot> = records
            .into_iter()
            .map(|record| AvailabilitySlot {
                start_at: record.start_at,
                end_at: target.service.end_for(record.start_at),
                barber_id: record
                    .staff_ref
                    .as_ref()
                    .and_then(|r| barber_ids.get(r).copied()),
            })
            .collect();
        slots.sort_by_key(|slot| slot.start_at);

        tracing::debug!(
            shop_id = %query.shop_id,
            service_id = %query.service_id,
            date = %query.date,
            count = slots.len(),
            "Resolved availability"
        );

        Ok(slots)
    }
}
