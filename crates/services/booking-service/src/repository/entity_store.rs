//! Entity store backed by SeaORM.
//!
//! Lookups return `Ok(None)` for missing rows; callers decide whether that
//! is a `NotFound`. Writes that must land together run in one transaction.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::{appointment, barber, customer, payment_record, service, shop};
use common::{AppError, AppResult};
use domain::{
    Appointment, AppointmentStatus, Barber, Customer, NewAppointment, NewCustomer,
    NewPaymentRecord, PaymentRecord, PaymentStatus, Service, Shop,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Entity store trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find_shop(&self, id: Uuid) -> AppResult<Option<Shop>>;

    async fn find_service(&self, id: Uuid) -> AppResult<Option<Service>>;

    async fn find_barber(&self, id: Uuid) -> AppResult<Option<Barber>>;

    /// Barbers of a shop whose provider staff reference is in `staff_refs`.
    ///
    /// One query for a whole result set; callers keep the first match per
    /// reference.
    async fn find_barbers_by_staff_refs(
        &self,
        shop_id: Uuid,
        staff_refs: &[String],
    ) -> AppResult<Vec<Barber>>;

    /// Find a shop's customer by phone number
    async fn find_customer_by_phone(&self, shop_id: Uuid, phone: &str)
        -> AppResult<Option<Customer>>;

    async fn create_customer(&self, customer: NewCustomer) -> AppResult<Customer>;

    /// Backfill the provider customer reference
    async fn set_customer_external_ref(
        &self,
        customer_id: Uuid,
        external_ref: String,
    ) -> AppResult<Customer>;

    /// Insert an appointment and, when given, its payment record in one
    /// transaction. Neither row exists if either insert fails.
    async fn record_booking(
        &self,
        appointment: NewAppointment,
        payment: Option<NewPaymentRecord>,
    ) -> AppResult<(Appointment, Option<PaymentRecord>)>;

    async fn find_appointment(&self, id: Uuid) -> AppResult<Option<Appointment>>;

    /// Latest payment record linked to an appointment
    async fn find_payment_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> AppResult<Option<PaymentRecord>>;

    /// Mark an appointment cancelled and, when given, its payment refunded.
    async fn mark_cancelled(
        &self,
        appointment_id: Uuid,
        refunded_payment_id: Option<Uuid>,
    ) -> AppResult<Appointment>;
}

/// Concrete implementation of EntityStore over a SQL database
pub struct SqlEntityStore {
    db: DatabaseConnection,
}

impl SqlEntityStore {
    /// Create new store instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)
    }

    async fn finish<T>(txn: DatabaseTransaction, result: AppResult<T>) -> AppResult<T> {
        match result {
            Ok(value) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn insert_booking(
        txn: &DatabaseTransaction,
        appointment: NewAppointment,
        payment: Option<NewPaymentRecord>,
    ) -> AppResult<(Appointment, Option<PaymentRecord>)> {
        let now = chrono::Utc::now();
        let appointment_id = Uuid::new_v4();

        let model = appointment::ActiveModel {
            id: Set(appointment_id),
            shop_id: Set(appointment.shop_id),
            barber_id: Set(appointment.barber_id),
            service_id: Set(appointment.service_id),
            customer_id: Set(appointment.customer_id),
            start_at: Set(appointment.start_at),
            end_at: Set(appointment.end_at),
            status: Set(AppointmentStatus::Booked.as_str().to_string()),
            external_booking_ref: Set(appointment.external_booking_ref),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;

        let payment = match payment {
            Some(payment) => {
                let record = payment_record::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    appointment_id: Set(Some(appointment_id)),
                    customer_id: Set(payment.customer_id),
                    external_payment_ref: Set(payment.external_payment_ref),
                    amount_cents: Set(payment.amount_cents),
                    currency: Set(payment.currency),
                    status: Set(payment.status.as_str().to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(txn)
                .await?;
                Some(PaymentRecord::from(record))
            }
            None => None,
        };

        Ok((Appointment::from(model), payment))
    }

    async fn update_cancelled(
        txn: &DatabaseTransaction,
        appointment_id: Uuid,
        refunded_payment_id: Option<Uuid>,
    ) -> AppResult<Appointment> {
        let now = chrono::Utc::now();

        let existing = appointment::Entity::find_by_id(appointment_id)
            .one(txn)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment"))?;
        let mut active: appointment::ActiveModel = existing.into();
        active.status = Set(AppointmentStatus::Cancelled.as_str().to_string());
        active.updated_at = Set(now);
        let model = active.update(txn).await?;

        if let Some(payment_id) = refunded_payment_id {
            let payment = payment_record::Entity::find_by_id(payment_id)
                .one(txn)
                .await?
                .ok_or_else(|| AppError::not_found("Payment record"))?;
            let mut active: payment_record::ActiveModel = payment.into();
            active.status = Set(PaymentStatus::Refunded.as_str().to_string());
            active.updated_at = Set(now);
            active.update(txn).await?;
        }

        Ok(Appointment::from(model))
    }
}

#[async_trait]
impl EntityStore for SqlEntityStore {
    async fn find_shop(&self, id: Uuid) -> AppResult<Option<Shop>> {
        let result = shop::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Shop::from))
    }

    async fn find_service(&self, id: Uuid) -> AppResult<Option<Service>> {
        let result = service::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Service::from))
    }

    async fn find_barber(&self, id: Uuid) -> AppResult<Option<Barber>> {
        let result = barber::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Barber::from))
    }

    async fn find_barbers_by_staff_refs(
        &self,
        shop_id: Uuid,
        staff_refs: &[String],
    ) -> AppResult<Vec<Barber>> {
        if staff_refs.is_empty() {
            return Ok(Vec::new());
        }

        let models = barber::Entity::find()
            .filter(barber::Column::ShopId.eq(shop_id))
            .filter(barber::Column::ExternalStaffRef.is_in(staff_refs.iter().cloned()))
            .order_by_asc(barber::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Barber::from).collect())
    }

    async fn find_customer_by_phone(
        &self,
        shop_id: Uuid,
        phone: &str,
    ) -> AppResult<Option<Customer>> {
        let result = customer::Entity::find()
            .filter(customer::Column::ShopId.eq(shop_id))
            .filter(customer::Column::Phone.eq(phone))
            .order_by_asc(customer::Column::CreatedAt)
            .one(&self.db)
            .await?;

        Ok(result.map(Customer::from))
    }

    async fn create_customer(&self, new: NewCustomer) -> AppResult<Customer> {
        let now = chrono::Utc::now();
        let active_model = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            shop_id: Set(new.shop_id),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            phone: Set(new.phone),
            email: Set(new.email),
            external_customer_ref: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Customer::from(model))
    }

    async fn set_customer_external_ref(
        &self,
        customer_id: Uuid,
        external_ref: String,
    ) -> AppResult<Customer> {
        let existing = customer::Entity::find_by_id(customer_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Customer"))?;

        let mut active: customer::ActiveModel = existing.into();
        active.external_customer_ref = Set(Some(external_ref));
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Customer::from(model))
    }

    async fn record_booking(
        &self,
        appointment: NewAppointment,
        payment: Option<NewPaymentRecord>,
    ) -> AppResult<(Appointment, Option<PaymentRecord>)> {
        let txn = self.begin().await?;
        let result = Self::insert_booking(&txn, appointment, payment).await;
        Self::finish(txn, result).await
    }

    async fn find_appointment(&self, id: Uuid) -> AppResult<Option<Appointment>> {
        let result = appointment::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Appointment::from))
    }

    async fn find_payment_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> AppResult<Option<PaymentRecord>> {
        let result = payment_record::Entity::find()
            .filter(payment_record::Column::AppointmentId.eq(appointment_id))
            .order_by_desc(payment_record::Column::CreatedAt)
            .one(&self.db)
            .await?;

        Ok(result.map(PaymentRecord::from))
    }

    async fn mark_cancelled(
        &self,
        appointment_id: Uuid,
        refunded_payment_id: Option<Uuid>,
    ) -> AppResult<Appointment> {
        let txn = self.begin().await?;
        let result = Self::update_cancelled(&txn, appointment_id, refunded_payment_id).await;
        Self::finish(txn, result).await
    }
}
