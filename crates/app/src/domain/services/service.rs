//! Service lifecycle engine.

use async_trait::async_trait;
use jiff::civil::Date;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    database::{Db, storage_now},
    domain::{
        owners::OwnerUuid,
        pagination::Page,
        services::{
            aging::{Urgency, business_days_between},
            data::{NewService, ServiceUpdate, ServicesFilter},
            errors::ServiceLifecycleError,
            lifecycle::{
                ensure_deletable, ensure_mutable, milestones_on_create, milestones_on_update,
                relocation,
            },
            records::{ServiceDetails, ServiceRecord, ServiceStats, ServiceUuid, utc_date},
            repository::{LocatedService, PgServicesRepository, ServiceState},
        },
        transfers::repository::PgTransferLogsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgServiceLifecycle {
    db: Db,
    repository: PgServicesRepository,
    transfer_logs: PgTransferLogsRepository,
}

impl PgServiceLifecycle {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgServicesRepository::new(),
            transfer_logs: PgTransferLogsRepository::new(),
        }
    }
}

#[async_trait]
impl ServiceLifecycle for PgServiceLifecycle {
    #[tracing::instrument(
        name = "services.service.create_service",
        skip(self, service),
        fields(owner_uuid = %owner, location_uuid = %service.location_uuid),
        err
    )]
    async fn create_service(
        &self,
        owner: OwnerUuid,
        service: NewService,
    ) -> Result<ServiceRecord, ServiceLifecycleError> {
        let fields = service.fields.sanitize()?;
        let now = storage_now();
        let status = service.status.unwrap_or_default();

        let state = ServiceState {
            fields: &fields,
            location: service.location_uuid,
            entry_date: service.entry_date.unwrap_or(now),
            status,
            milestones: milestones_on_create(status, service.milestones, now),
        };

        let mut tx = self.db.begin_owner_transaction(owner).await?;

        let created = self
            .repository
            .create_service(&mut tx, owner, state, now)
            .await?;

        tx.commit().await?;

        info!(service_uuid = %created.uuid, status = %created.status, "created service");

        Ok(created)
    }

    #[tracing::instrument(
        name = "services.service.update_service",
        skip(self, update),
        fields(owner_uuid = %owner, service_uuid = %service, status = %update.status),
        err
    )]
    async fn update_service(
        &self,
        owner: OwnerUuid,
        service: ServiceUuid,
        update: ServiceUpdate,
    ) -> Result<ServiceRecord, ServiceLifecycleError> {
        let fields = update.fields.sanitize()?;

        let mut tx = self.db.begin_owner_transaction(owner).await?;

        let current = self
            .repository
            .lock_service(&mut tx, owner, service)
            .await?
            .ok_or(ServiceLifecycleError::NotFound)?;

        ensure_mutable(current.status)?;

        let now = storage_now();

        let state = ServiceState {
            fields: &fields,
            location: update.location_uuid,
            entry_date: update.entry_date.unwrap_or(current.entry_date),
            status: update.status,
            milestones: milestones_on_update(&current, update.status, update.milestones, now),
        };

        let updated = self
            .repository
            .update_service(&mut tx, owner, service, state, now)
            .await?;

        if let Some(moved) = relocation(current.location_uuid, updated.location_uuid) {
            let log = self
                .transfer_logs
                .create_transfer_log(&mut tx, service, moved.from, moved.to, now)
                .await?;

            debug!(
                transfer_log_uuid = %log.uuid,
                from_location_uuid = %moved.from,
                to_location_uuid = %moved.to,
                "logged transfer"
            );
        }

        tx.commit().await?;

        info!(
            service_uuid = %updated.uuid,
            previous_status = %current.status,
            status = %updated.status,
            "updated service"
        );

        Ok(updated)
    }

    #[tracing::instrument(
        name = "services.service.delete_service",
        skip(self),
        fields(owner_uuid = %owner, service_uuid = %service),
        err
    )]
    async fn delete_service(
        &self,
        owner: OwnerUuid,
        service: ServiceUuid,
    ) -> Result<(), ServiceLifecycleError> {
        let mut tx = self.db.begin_owner_transaction(owner).await?;

        let current = self
            .repository
            .lock_service(&mut tx, owner, service)
            .await?
            .ok_or(ServiceLifecycleError::NotFound)?;

        ensure_deletable(current.status)?;

        let removed_logs = self
            .transfer_logs
            .delete_service_transfer_logs(&mut tx, owner, service)
            .await?;

        let rows_affected = self
            .repository
            .delete_service(&mut tx, owner, service)
            .await?;

        if rows_affected == 0 {
            return Err(ServiceLifecycleError::NotFound);
        }

        tx.commit().await?;

        info!(service_uuid = %service, removed_logs, "deleted service");

        Ok(())
    }

    #[tracing::instrument(
        name = "services.service.get_service",
        skip(self),
        fields(owner_uuid = %owner, service_uuid = %service),
        err
    )]
    async fn get_service(
        &self,
        owner: OwnerUuid,
        service: ServiceUuid,
    ) -> Result<ServiceDetails, ServiceLifecycleError> {
        let mut tx = self.db.begin_owner_transaction(owner).await?;

        let located = self
            .repository
            .get_service(&mut tx, owner, service)
            .await?;

        let mut history = self
            .transfer_logs
            .list_service_history(&mut tx, owner, &[service])
            .await?;

        tx.commit().await?;

        Ok(ServiceDetails {
            history: history.remove(&service).unwrap_or_default(),
            service: located.service,
            location_name: located.location_name,
        })
    }

    #[tracing::instrument(
        name = "services.service.list_services",
        skip(self, filter),
        fields(
            owner_uuid = %owner,
            page = filter.page.page,
            limit = filter.page.limit,
            total = tracing::field::Empty
        ),
        err
    )]
    async fn list_services(
        &self,
        owner: OwnerUuid,
        filter: ServicesFilter,
    ) -> Result<Page<ServiceDetails>, ServiceLifecycleError> {
        filter.page.validate()?;

        let mut tx = self.db.begin_owner_transaction(owner).await?;

        let located = self
            .repository
            .list_services(&mut tx, owner, &filter)
            .await?;

        let total = self
            .repository
            .count_services(&mut tx, owner, &filter)
            .await?;

        let uuids: Vec<ServiceUuid> = located.iter().map(|row| row.service.uuid).collect();

        let mut history = self
            .transfer_logs
            .list_service_history(&mut tx, owner, &uuids)
            .await?;

        tx.commit().await?;

        tracing::Span::current().record("total", total);

        let entries = located
            .into_iter()
            .map(|LocatedService { service, location_name }| ServiceDetails {
                history: history.remove(&service.uuid).unwrap_or_default(),
                service,
                location_name,
            })
            .collect();

        Ok(Page::new(entries, total, filter.page))
    }

    #[tracing::instrument(
        name = "services.service.service_stats",
        skip(self),
        fields(owner_uuid = %owner, today = %today),
        err
    )]
    async fn service_stats(
        &self,
        owner: OwnerUuid,
        today: Date,
    ) -> Result<ServiceStats, ServiceLifecycleError> {
        let mut tx = self.db.begin_owner_transaction(owner).await?;

        let counts = self
            .repository
            .count_services_by_status(&mut tx, owner)
            .await?;

        let pending_since = self
            .repository
            .list_pending_entry_dates(&mut tx, owner)
            .await?;

        tx.commit().await?;

        let mut stats = ServiceStats::default();

        for (status, count) in counts {
            stats.add_status_count(status, count);
        }

        for entry_date in pending_since {
            let days = business_days_between(utc_date(entry_date), today);

            stats.add_pending_urgency(Urgency::from_business_days(days));
        }

        Ok(stats)
    }
}

#[automock]
#[async_trait]
pub trait ServiceLifecycle: Send + Sync {
    /// Intake a service. No transfer is logged on creation.
    async fn create_service(
        &self,
        owner: OwnerUuid,
        service: NewService,
    ) -> Result<ServiceRecord, ServiceLifecycleError>;

    /// Apply an update to a non-terminal service, re-deriving its milestone
    /// dates and logging a transfer when the location changes.
    async fn update_service(
        &self,
        owner: OwnerUuid,
        service: ServiceUuid,
        update: ServiceUpdate,
    ) -> Result<ServiceRecord, ServiceLifecycleError>;

    /// Delete a service together with its transfer history.
    async fn delete_service(
        &self,
        owner: OwnerUuid,
        service: ServiceUuid,
    ) -> Result<(), ServiceLifecycleError>;

    /// Retrieve a single service with its location name and history.
    async fn get_service(
        &self,
        owner: OwnerUuid,
        service: ServiceUuid,
    ) -> Result<ServiceDetails, ServiceLifecycleError>;

    /// Filtered, sorted, paginated listing of the owner's services.
    async fn list_services(
        &self,
        owner: OwnerUuid,
        filter: ServicesFilter,
    ) -> Result<Page<ServiceDetails>, ServiceLifecycleError>;

    /// Status counters and pending-service urgency as of `today`.
    async fn service_stats(
        &self,
        owner: OwnerUuid,
        today: Date,
    ) -> Result<ServiceStats, ServiceLifecycleError>;
}

#[cfg(test)]
mod tests {
    use jiff::{Timestamp, ToSpan, civil::date};
    use smallvec::smallvec;
    use sqlx::query;
    use testresult::TestResult;

    use crate::{
        domain::{
            locations::{LocationsService, LocationsServiceError, data::NewLocation},
            pagination::PageRequest,
            services::{
                data::{ServiceFields, SortOrder},
                records::{Milestones, ServiceStatus},
            },
            transfers::{TransferLogsService, data::TransferLogsFilter},
        },
        test::{TestContext, helpers},
    };

    use super::*;

    #[tokio::test]
    async fn create_service_defaults_to_pending_now() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let started = Timestamp::now();

        let service = helpers::create_service(&ctx, taller.uuid).await?;

        assert_eq!(service.status, ServiceStatus::Pending);
        assert_eq!(service.owner_uuid, ctx.owner_uuid);
        assert_eq!(service.location_uuid, taller.uuid);
        assert!(service.entry_date >= started, "entry date predates the call");
        assert_eq!(service.milestones, Milestones::default());

        let logs = ctx
            .transfer_logs
            .list_transfer_logs(ctx.owner_uuid, TransferLogsFilter::default())
            .await?;

        assert_eq!(logs.total, 0, "creation must not log a transfer");

        Ok(())
    }

    #[tokio::test]
    async fn create_service_as_cancelled_stamps_cancellation() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;

        let service = ctx
            .services
            .create_service(
                ctx.owner_uuid,
                NewService {
                    status: Some(ServiceStatus::Cancelled),
                    ..helpers::new_service(taller.uuid)
                },
            )
            .await?;

        assert_eq!(service.status, ServiceStatus::Cancelled);
        assert!(service.milestones.cancellation_date.is_some(), "cancellation date missing");
        assert_eq!(service.milestones.ready_date, None);

        Ok(())
    }

    #[tokio::test]
    async fn create_service_keeps_supplied_entry_date() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let entry: Timestamp = "2025-01-15T13:30:00Z".parse()?;

        let service = ctx
            .services
            .create_service(
                ctx.owner_uuid,
                NewService {
                    entry_date: Some(entry),
                    ..helpers::new_service(taller.uuid)
                },
            )
            .await?;

        assert_eq!(service.entry_date, entry);

        Ok(())
    }

    #[tokio::test]
    async fn create_service_with_invalid_fields_fails_validation() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;

        let result = ctx
            .services
            .create_service(
                ctx.owner_uuid,
                NewService {
                    fields: ServiceFields {
                        invoice_number: String::new(),
                        ..helpers::service_fields()
                    },
                    ..helpers::new_service(taller.uuid)
                },
            )
            .await;

        assert!(
            matches!(result, Err(ServiceLifecycleError::Validation(_))),
            "expected Validation, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_service_in_foreign_location_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        let foreign = ctx
            .locations
            .create_location(
                OwnerUuid::new(),
                NewLocation {
                    name: "Ajena".to_string(),
                    address: None,
                },
            )
            .await?;

        let result = ctx
            .services
            .create_service(ctx.owner_uuid, helpers::new_service(foreign.uuid))
            .await;

        assert!(
            matches!(result, Err(ServiceLifecycleError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn relocation_then_completion_scenario() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let bodega = helpers::create_location(&ctx, "Bodega").await?;
        let service = helpers::create_service(&ctx, taller.uuid).await?;
        let started = Timestamp::now();

        let moved = helpers::move_service(&ctx, service.uuid, bodega.uuid).await?;

        assert_eq!(moved.location_uuid, bodega.uuid);

        let details = ctx.services.get_service(ctx.owner_uuid, service.uuid).await?;

        assert_eq!(details.location_name, "Bodega");
        assert_eq!(details.history.len(), 1);

        let transfer = details.history.first().ok_or("missing transfer")?;

        assert_eq!(transfer.log.from_location_uuid, taller.uuid);
        assert_eq!(transfer.log.to_location_uuid, bodega.uuid);
        assert_eq!(transfer.from_location_name, "Taller");
        assert_eq!(transfer.to_location_name, "Bodega");
        assert!(transfer.log.changed_at >= started, "transfer predates the update");

        let completed = ctx
            .services
            .update_service(
                ctx.owner_uuid,
                service.uuid,
                ServiceUpdate {
                    status: ServiceStatus::Completed,
                    ..ServiceUpdate::from(&moved)
                },
            )
            .await?;

        assert!(completed.milestones.ready_date.is_some(), "ready date missing");
        assert!(completed.milestones.delivery_date.is_some(), "delivery date missing");

        let renamed = ctx
            .services
            .update_service(
                ctx.owner_uuid,
                service.uuid,
                ServiceUpdate {
                    fields: ServiceFields {
                        client_name: "Otro Cliente".to_string(),
                        ..ServiceFields::from(&completed)
                    },
                    ..ServiceUpdate::from(&completed)
                },
            )
            .await;

        assert!(
            matches!(
                renamed,
                Err(ServiceLifecycleError::Immutable(ServiceStatus::Completed))
            ),
            "expected Immutable, got {renamed:?}"
        );

        let resaved = ctx
            .services
            .update_service(ctx.owner_uuid, service.uuid, ServiceUpdate::from(&completed))
            .await;

        assert!(
            matches!(resaved, Err(ServiceLifecycleError::Immutable(_))),
            "re-saving a completed service should fail, got {resaved:?}"
        );

        let deleted = ctx.services.delete_service(ctx.owner_uuid, service.uuid).await;

        assert!(
            matches!(deleted, Err(ServiceLifecycleError::Immutable(_))),
            "deleting a completed service should fail, got {deleted:?}"
        );

        let taller_deleted = ctx
            .locations
            .delete_location(ctx.owner_uuid, taller.uuid)
            .await;

        assert!(
            matches!(taller_deleted, Err(LocationsServiceError::InUse)),
            "expected InUse for a past transfer endpoint, got {taller_deleted:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn completing_and_moving_at_once_still_logs_the_move() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let tienda = helpers::create_location(&ctx, "Tienda").await?;
        let service = helpers::create_service(&ctx, taller.uuid).await?;

        ctx.services
            .update_service(
                ctx.owner_uuid,
                service.uuid,
                ServiceUpdate {
                    location_uuid: tienda.uuid,
                    status: ServiceStatus::Completed,
                    ..ServiceUpdate::from(&service)
                },
            )
            .await?;

        let details = ctx.services.get_service(ctx.owner_uuid, service.uuid).await?;

        assert_eq!(details.history.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn unchanged_location_logs_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let service = helpers::create_service(&ctx, taller.uuid).await?;

        let ready = ctx
            .services
            .update_service(
                ctx.owner_uuid,
                service.uuid,
                ServiceUpdate {
                    status: ServiceStatus::Ready,
                    ..ServiceUpdate::from(&service)
                },
            )
            .await?;

        assert!(ready.milestones.ready_date.is_some(), "ready date missing");
        assert_eq!(ready.milestones.delivery_date, None);

        let details = ctx.services.get_service(ctx.owner_uuid, service.uuid).await?;

        assert!(details.history.is_empty(), "no move, no transfer");

        Ok(())
    }

    #[tokio::test]
    async fn returning_to_pending_clears_milestones() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let service = helpers::create_service(&ctx, taller.uuid).await?;

        let ready = ctx
            .services
            .update_service(
                ctx.owner_uuid,
                service.uuid,
                ServiceUpdate {
                    status: ServiceStatus::Ready,
                    ..ServiceUpdate::from(&service)
                },
            )
            .await?;

        let pending = ctx
            .services
            .update_service(
                ctx.owner_uuid,
                service.uuid,
                ServiceUpdate {
                    status: ServiceStatus::Pending,
                    ..ServiceUpdate::from(&ready)
                },
            )
            .await?;

        assert_eq!(pending.milestones, Milestones::default());

        Ok(())
    }

    #[tokio::test]
    async fn cancelled_service_is_frozen_but_deletable() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let bodega = helpers::create_location(&ctx, "Bodega").await?;
        let service = helpers::create_service(&ctx, taller.uuid).await?;
        let moved = helpers::move_service(&ctx, service.uuid, bodega.uuid).await?;

        let cancelled = ctx
            .services
            .update_service(
                ctx.owner_uuid,
                service.uuid,
                ServiceUpdate {
                    status: ServiceStatus::Cancelled,
                    ..ServiceUpdate::from(&moved)
                },
            )
            .await?;

        let reopened = ctx
            .services
            .update_service(
                ctx.owner_uuid,
                service.uuid,
                ServiceUpdate {
                    status: ServiceStatus::Pending,
                    ..ServiceUpdate::from(&cancelled)
                },
            )
            .await;

        assert!(
            matches!(
                reopened,
                Err(ServiceLifecycleError::Immutable(ServiceStatus::Cancelled))
            ),
            "expected Immutable, got {reopened:?}"
        );

        ctx.services
            .delete_service(ctx.owner_uuid, service.uuid)
            .await?;

        let logs = ctx
            .transfer_logs
            .list_transfer_logs(ctx.owner_uuid, TransferLogsFilter::default())
            .await?;

        assert_eq!(logs.total, 0, "transfer history should go with the service");

        ctx.locations
            .delete_location(ctx.owner_uuid, taller.uuid)
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn other_owner_cannot_touch_a_service() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let service = helpers::create_service(&ctx, taller.uuid).await?;
        let intruder = OwnerUuid::new();

        let fetched = ctx.services.get_service(intruder, service.uuid).await;

        assert!(
            matches!(fetched, Err(ServiceLifecycleError::NotFound)),
            "expected NotFound, got {fetched:?}"
        );

        let updated = ctx
            .services
            .update_service(intruder, service.uuid, ServiceUpdate::from(&service))
            .await;

        assert!(
            matches!(updated, Err(ServiceLifecycleError::NotFound)),
            "expected NotFound, got {updated:?}"
        );

        let deleted = ctx.services.delete_service(intruder, service.uuid).await;

        assert!(
            matches!(deleted, Err(ServiceLifecycleError::NotFound)),
            "expected NotFound, got {deleted:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_service_with_invalid_fields_fails_validation() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let service = helpers::create_service(&ctx, taller.uuid).await?;

        let mut update = ServiceUpdate::from(&service);
        update.fields.client_name = "   ".to_string();

        let result = ctx
            .services
            .update_service(ctx.owner_uuid, service.uuid, update)
            .await;

        assert!(
            matches!(result, Err(ServiceLifecycleError::Validation(_))),
            "expected Validation, got {result:?}"
        );

        let details = ctx.services.get_service(ctx.owner_uuid, service.uuid).await?;

        assert_eq!(details.service.client_name, service.client_name);

        Ok(())
    }

    #[tokio::test]
    async fn moving_to_a_foreign_location_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let service = helpers::create_service(&ctx, taller.uuid).await?;

        let foreign = ctx
            .locations
            .create_location(
                OwnerUuid::new(),
                NewLocation {
                    name: "Ajena".to_string(),
                    address: None,
                },
            )
            .await?;

        let result = helpers::move_service(&ctx, service.uuid, foreign.uuid).await;

        assert!(
            matches!(result, Err(ServiceLifecycleError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );

        let details = ctx.services.get_service(ctx.owner_uuid, service.uuid).await?;

        assert_eq!(details.service.location_uuid, taller.uuid);
        assert!(details.history.is_empty(), "no transfer should be logged");

        Ok(())
    }

    #[tokio::test]
    async fn failed_transfer_log_rolls_back_the_move() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let bodega = helpers::create_location(&ctx, "Bodega").await?;
        let service = helpers::create_service(&ctx, taller.uuid).await?;

        query(
            "CREATE FUNCTION reject_transfer_log() RETURNS trigger LANGUAGE plpgsql AS $$ \
             BEGIN RAISE EXCEPTION 'transfer logging unavailable'; END $$",
        )
        .execute(ctx.db.pool())
        .await?;

        query(
            "CREATE TRIGGER transfer_logs_reject_insert BEFORE INSERT ON transfer_logs \
             FOR EACH ROW EXECUTE PROCEDURE reject_transfer_log()",
        )
        .execute(ctx.db.pool())
        .await?;

        let result = helpers::move_service(&ctx, service.uuid, bodega.uuid).await;

        assert!(
            matches!(result, Err(ServiceLifecycleError::Sql(_))),
            "expected a storage failure, got {result:?}"
        );

        let details = ctx.services.get_service(ctx.owner_uuid, service.uuid).await?;

        assert_eq!(details.service.location_uuid, taller.uuid);
        assert_eq!(details.service.updated_at, service.updated_at);
        assert!(details.history.is_empty(), "no transfer should be logged");

        Ok(())
    }

    #[tokio::test]
    async fn get_service_is_traced() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let service = helpers::create_service(&ctx, taller.uuid).await?;
        let (spans, _guard) = helpers::record_spans();

        let details = ctx.services.get_service(ctx.owner_uuid, service.uuid).await?;

        assert_eq!(details.service, service);
        assert!(
            spans.contains("services.service.get_service"),
            "get_service should open its span"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_of_missing_service_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let service = helpers::create_service(&ctx, taller.uuid).await?;

        let result = ctx
            .services
            .update_service(ctx.owner_uuid, ServiceUuid::new(), ServiceUpdate::from(&service))
            .await;

        assert!(
            matches!(result, Err(ServiceLifecycleError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn second_page_holds_items_twenty_one_to_forty() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let first_entry: Timestamp = "2025-01-01T09:00:00Z".parse()?;

        let mut created = Vec::new();

        for hour in 0..45_i64 {
            let service = ctx
                .services
                .create_service(
                    ctx.owner_uuid,
                    NewService {
                        entry_date: Some(first_entry.checked_add(hour.hours())?),
                        ..helpers::new_service(taller.uuid)
                    },
                )
                .await?;

            created.push(service.uuid);
        }

        let page = ctx
            .services
            .list_services(
                ctx.owner_uuid,
                ServicesFilter {
                    page: PageRequest::new(2, 20)?,
                    ..ServicesFilter::default()
                },
            )
            .await?;

        let listed: Vec<ServiceUuid> = page.entries.iter().map(|e| e.service.uuid).collect();

        assert_eq!(page.total, 45);
        assert_eq!(listed, created.get(20..40).ok_or("short fixture")?.to_vec());

        let newest_first = ctx
            .services
            .list_services(
                ctx.owner_uuid,
                ServicesFilter {
                    page: PageRequest::new(1, 5)?,
                    sort_order: SortOrder::Desc,
                    ..ServicesFilter::default()
                },
            )
            .await?;

        let first = newest_first.entries.first().ok_or("empty page")?;

        assert_eq!(Some(&first.service.uuid), created.last());
        assert_eq!(newest_first.total, 45);

        Ok(())
    }

    #[tokio::test]
    async fn list_services_filters_by_search_status_and_location() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let bodega = helpers::create_location(&ctx, "Bodega").await?;

        let ana = ctx
            .services
            .create_service(
                ctx.owner_uuid,
                NewService {
                    fields: ServiceFields {
                        client_name: "Ana Pérez".to_string(),
                        rut: Some("11111111-1".to_string()),
                        ..helpers::service_fields()
                    },
                    ..helpers::new_service(taller.uuid)
                },
            )
            .await?;

        let bruno = ctx
            .services
            .create_service(
                ctx.owner_uuid,
                NewService {
                    fields: ServiceFields {
                        client_name: "Bruno Díaz".to_string(),
                        invoice_number: "B-77".to_string(),
                        ..helpers::service_fields()
                    },
                    status: Some(ServiceStatus::Ready),
                    ..helpers::new_service(bodega.uuid)
                },
            )
            .await?;

        let search = |term: &str| ServicesFilter {
            search: Some(term.to_string()),
            ..ServicesFilter::default()
        };

        let by_name = ctx.services.list_services(ctx.owner_uuid, search("ana p")).await?;
        let by_rut = ctx.services.list_services(ctx.owner_uuid, search("11.111")).await?;
        let by_invoice = ctx.services.list_services(ctx.owner_uuid, search("b-7")).await?;
        let wildcard = ctx.services.list_services(ctx.owner_uuid, search("%")).await?;

        assert_eq!(by_name.total, 1);
        assert_eq!(by_name.entries.first().map(|e| e.service.uuid), Some(ana.uuid));
        assert_eq!(by_rut.total, 1);
        assert_eq!(by_invoice.entries.first().map(|e| e.service.uuid), Some(bruno.uuid));
        assert_eq!(wildcard.total, 0, "percent sign must match literally");

        let ready_or_completed = ctx
            .services
            .list_services(
                ctx.owner_uuid,
                ServicesFilter {
                    statuses: smallvec![ServiceStatus::Ready, ServiceStatus::Completed],
                    ..ServicesFilter::default()
                },
            )
            .await?;

        assert_eq!(ready_or_completed.total, 1);

        let in_taller = ctx
            .services
            .list_services(
                ctx.owner_uuid,
                ServicesFilter {
                    location: Some(taller.uuid),
                    ..ServicesFilter::default()
                },
            )
            .await?;

        let only = in_taller.entries.first().ok_or("empty page")?;

        assert_eq!(in_taller.total, 1);
        assert_eq!(only.location_name, "Taller");

        Ok(())
    }

    #[tokio::test]
    async fn list_services_attaches_newest_first_history() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let bodega = helpers::create_location(&ctx, "Bodega").await?;
        let service = helpers::create_service(&ctx, taller.uuid).await?;
        let untouched = helpers::create_service(&ctx, taller.uuid).await?;

        helpers::move_service(&ctx, service.uuid, bodega.uuid).await?;
        helpers::move_service(&ctx, service.uuid, taller.uuid).await?;

        let page = ctx
            .services
            .list_services(ctx.owner_uuid, ServicesFilter::default())
            .await?;

        let moved = page
            .entries
            .iter()
            .find(|e| e.service.uuid == service.uuid)
            .ok_or("moved service missing")?;

        let still = page
            .entries
            .iter()
            .find(|e| e.service.uuid == untouched.uuid)
            .ok_or("untouched service missing")?;

        let destinations: Vec<&str> = moved
            .history
            .iter()
            .map(|m| m.to_location_name.as_str())
            .collect();

        assert_eq!(destinations, vec!["Taller", "Bodega"]);
        assert!(still.history.is_empty(), "unmoved service has history");

        Ok(())
    }

    #[tokio::test]
    async fn page_zero_is_a_validation_failure() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .services
            .list_services(
                ctx.owner_uuid,
                ServicesFilter {
                    page: PageRequest { page: 0, limit: 20 },
                    ..ServicesFilter::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(ServiceLifecycleError::InvalidPage(_))),
            "expected InvalidPage, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn stats_count_statuses_and_overdue_pending() -> TestResult {
        let ctx = TestContext::new().await;
        let taller = helpers::create_location(&ctx, "Taller").await?;
        let today = date(2025, 6, 2);

        for entry in [
            "2025-05-05T10:00:00Z",
            "2025-05-19T10:00:00Z",
            "2025-05-28T10:00:00Z",
        ] {
            ctx.services
                .create_service(
                    ctx.owner_uuid,
                    NewService {
                        entry_date: Some(entry.parse::<Timestamp>()?),
                        ..helpers::new_service(taller.uuid)
                    },
                )
                .await?;
        }

        ctx.services
            .create_service(
                ctx.owner_uuid,
                NewService {
                    entry_date: Some("2025-01-02T10:00:00Z".parse::<Timestamp>()?),
                    status: Some(ServiceStatus::Ready),
                    ..helpers::new_service(taller.uuid)
                },
            )
            .await?;

        let stats = ctx.services.service_stats(ctx.owner_uuid, today).await?;

        assert_eq!(stats.pending, 3);
        assert_eq!(stats.ready, 1);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.critical, 1);
        assert_eq!(stats.due_soon, 1);

        Ok(())
    }
}
