//! Services Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, Row, Transaction,
    postgres::{PgArguments, PgRow},
    query, query::QueryAs, query_as, query_scalar,
};

use crate::domain::{
    locations::records::LocationUuid,
    owners::OwnerUuid,
    services::{
        data::{ServiceFields, ServicesFilter},
        records::{Milestones, ServiceRecord, ServiceStatus, ServiceUuid},
    },
};

const CREATE_SERVICE_SQL: &str = include_str!("sql/create_service.sql");
const LOCK_SERVICE_SQL: &str = include_str!("sql/lock_service.sql");
const UPDATE_SERVICE_SQL: &str = include_str!("sql/update_service.sql");
const DELETE_SERVICE_SQL: &str = include_str!("sql/delete_service.sql");
const GET_SERVICE_SQL: &str = include_str!("sql/get_service.sql");
const LIST_SERVICES_SQL: &str = include_str!("sql/list_services.sql");
const COUNT_SERVICES_SQL: &str = include_str!("sql/count_services.sql");
const COUNT_SERVICES_BY_STATUS_SQL: &str = include_str!("sql/count_services_by_status.sql");
const LIST_PENDING_ENTRY_DATES_SQL: &str = include_str!("sql/list_pending_entry_dates.sql");

type ServiceQuery<'q> = QueryAs<'q, Postgres, ServiceRecord, PgArguments>;

/// Everything a write stores besides identity and bookkeeping timestamps.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ServiceState<'a> {
    pub(crate) fields: &'a ServiceFields,
    pub(crate) location: LocationUuid,
    pub(crate) entry_date: Timestamp,
    pub(crate) status: ServiceStatus,
    pub(crate) milestones: Milestones,
}

/// Service joined with the name of the location holding it.
#[derive(Debug, Clone)]
pub(crate) struct LocatedService {
    pub(crate) service: ServiceRecord,
    pub(crate) location_name: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgServicesRepository;

impl PgServicesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_service(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        state: ServiceState<'_>,
        now: Timestamp,
    ) -> Result<ServiceRecord, sqlx::Error> {
        let query = query_as::<Postgres, ServiceRecord>(CREATE_SERVICE_SQL)
            .bind(ServiceUuid::new().into_uuid())
            .bind(owner.into_uuid());

        bind_state(query, state)?
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch the service and hold a row lock until the transaction ends.
    pub(crate) async fn lock_service(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        service: ServiceUuid,
    ) -> Result<Option<ServiceRecord>, sqlx::Error> {
        query_as::<Postgres, ServiceRecord>(LOCK_SERVICE_SQL)
            .bind(service.into_uuid())
            .bind(owner.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn update_service(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        service: ServiceUuid,
        state: ServiceState<'_>,
        now: Timestamp,
    ) -> Result<ServiceRecord, sqlx::Error> {
        let query = query_as::<Postgres, ServiceRecord>(UPDATE_SERVICE_SQL)
            .bind(service.into_uuid())
            .bind(owner.into_uuid());

        bind_state(query, state)?
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_service(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        service: ServiceUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_SERVICE_SQL)
            .bind(service.into_uuid())
            .bind(owner.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn get_service(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        service: ServiceUuid,
    ) -> Result<LocatedService, sqlx::Error> {
        query_as::<Postgres, LocatedService>(GET_SERVICE_SQL)
            .bind(service.into_uuid())
            .bind(owner.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    #[tracing::instrument(
        name = "services.repository.list_services",
        skip(self, tx, filter),
        fields(owner_uuid = %owner, service_count = tracing::field::Empty),
        err
    )]
    pub(crate) async fn list_services(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        filter: &ServicesFilter,
    ) -> Result<Vec<LocatedService>, sqlx::Error> {
        let services = query_as::<Postgres, LocatedService>(LIST_SERVICES_SQL)
            .bind(owner.into_uuid())
            .bind(filter.search_pattern())
            .bind(filter.status_names())
            .bind(filter.location.map(LocationUuid::into_uuid))
            .bind(filter.sort_order.is_descending())
            .bind(filter.page.sql_limit())
            .bind(filter.page.sql_offset())
            .fetch_all(&mut **tx)
            .await?;

        tracing::Span::current().record("service_count", services.len());

        Ok(services)
    }

    pub(crate) async fn count_services(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        filter: &ServicesFilter,
    ) -> Result<u64, sqlx::Error> {
        let total: i64 = query_scalar(COUNT_SERVICES_SQL)
            .bind(owner.into_uuid())
            .bind(filter.search_pattern())
            .bind(filter.status_names())
            .bind(filter.location.map(LocationUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(total).map_err(|e| sqlx::Error::Decode(Box::new(e)))
    }

    pub(crate) async fn count_services_by_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
    ) -> Result<Vec<(ServiceStatus, u64)>, sqlx::Error> {
        let rows = query(COUNT_SERVICES_BY_STATUS_SQL)
            .bind(owner.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| {
                let count: i64 = row.try_get("service_count")?;
                let count = u64::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "service_count".to_string(),
                    source: Box::new(e),
                })?;

                Ok((status_column(row)?, count))
            })
            .collect()
    }

    pub(crate) async fn list_pending_entry_dates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
    ) -> Result<Vec<Timestamp>, sqlx::Error> {
        let dates: Vec<SqlxTimestamp> = query_scalar(LIST_PENDING_ENTRY_DATES_SQL)
            .bind(owner.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(dates.into_iter().map(SqlxTimestamp::to_jiff).collect())
    }
}

/// Bind `$3` through `$18`, shared by insert and update.
fn bind_state<'q>(
    query: ServiceQuery<'q>,
    state: ServiceState<'q>,
) -> Result<ServiceQuery<'q>, sqlx::Error> {
    let fields = state.fields;

    let repair_cost = fields
        .repair_cost
        .map(i64::try_from)
        .transpose()
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    Ok(query
        .bind(fields.invoice_number.as_str())
        .bind(fields.client_name.as_str())
        .bind(fields.rut.as_deref())
        .bind(fields.contact.as_str())
        .bind(fields.email.as_deref())
        .bind(fields.product.as_str())
        .bind(fields.sku.as_deref())
        .bind(fields.failure_description.as_deref())
        .bind(state.location.into_uuid())
        .bind(SqlxTimestamp::from(state.entry_date))
        .bind(state.milestones.ready_date.map(SqlxTimestamp::from))
        .bind(state.milestones.delivery_date.map(SqlxTimestamp::from))
        .bind(state.milestones.cancellation_date.map(SqlxTimestamp::from))
        .bind(state.status.as_str())
        .bind(repair_cost)
        .bind(fields.notes.as_deref()))
}

fn status_column(row: &PgRow) -> Result<ServiceStatus, sqlx::Error> {
    let status: String = row.try_get("status")?;

    status.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: Box::new(e),
    })
}

fn optional_timestamp(row: &PgRow, column: &str) -> Result<Option<Timestamp>, sqlx::Error> {
    Ok(row
        .try_get::<Option<SqlxTimestamp>, _>(column)?
        .map(SqlxTimestamp::to_jiff))
}

impl<'r> FromRow<'r, PgRow> for ServiceRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let repair_cost = row
            .try_get::<Option<i64>, _>("repair_cost")?
            .map(u64::try_from)
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "repair_cost".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: ServiceUuid::from_uuid(row.try_get("uuid")?),
            owner_uuid: OwnerUuid::from_uuid(row.try_get("owner_uuid")?),
            invoice_number: row.try_get("invoice_number")?,
            client_name: row.try_get("client_name")?,
            rut: row.try_get("rut")?,
            contact: row.try_get("contact")?,
            email: row.try_get("email")?,
            product: row.try_get("product")?,
            sku: row.try_get("sku")?,
            failure_description: row.try_get("failure_description")?,
            location_uuid: LocationUuid::from_uuid(row.try_get("location_uuid")?),
            entry_date: row.try_get::<SqlxTimestamp, _>("entry_date")?.to_jiff(),
            milestones: Milestones {
                ready_date: optional_timestamp(row, "ready_date")?,
                delivery_date: optional_timestamp(row, "delivery_date")?,
                cancellation_date: optional_timestamp(row, "cancellation_date")?,
            },
            status: status_column(row)?,
            repair_cost,
            notes: row.try_get("notes")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for LocatedService {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            service: ServiceRecord::from_row(row)?,
            location_name: row.try_get("location_name")?,
        })
    }
}
