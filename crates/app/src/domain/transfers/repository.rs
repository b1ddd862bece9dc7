//! Transfer Logs Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::{
    locations::records::LocationUuid,
    owners::OwnerUuid,
    pagination::PageRequest,
    services::records::ServiceUuid,
    transfers::{
        data::ChangedRange,
        records::{TransferLogEntry, TransferLogRecord, TransferLogUuid, TransferMove},
    },
};

const CREATE_TRANSFER_LOG_SQL: &str = include_str!("sql/create_transfer_log.sql");
const DELETE_SERVICE_TRANSFER_LOGS_SQL: &str = include_str!("sql/delete_service_transfer_logs.sql");
const LIST_SERVICE_HISTORY_SQL: &str = include_str!("sql/list_service_history.sql");
const LIST_TRANSFER_LOGS_SQL: &str = include_str!("sql/list_transfer_logs.sql");
const COUNT_TRANSFER_LOGS_SQL: &str = include_str!("sql/count_transfer_logs.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgTransferLogsRepository;

impl PgTransferLogsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_transfer_log(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        service: ServiceUuid,
        from: LocationUuid,
        to: LocationUuid,
        changed_at: Timestamp,
    ) -> Result<TransferLogRecord, sqlx::Error> {
        query_as::<Postgres, TransferLogRecord>(CREATE_TRANSFER_LOG_SQL)
            .bind(TransferLogUuid::new().into_uuid())
            .bind(service.into_uuid())
            .bind(from.into_uuid())
            .bind(to.into_uuid())
            .bind(SqlxTimestamp::from(changed_at))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_service_transfer_logs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        service: ServiceUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_SERVICE_TRANSFER_LOGS_SQL)
            .bind(service.into_uuid())
            .bind(owner.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Load the newest-first move history of several services in one round trip.
    #[tracing::instrument(
        name = "transfers.repository.list_service_history",
        skip(self, tx, services),
        fields(
            owner_uuid = %owner,
            service_count = services.len(),
            transfer_count = tracing::field::Empty
        ),
        err
    )]
    pub(crate) async fn list_service_history(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        services: &[ServiceUuid],
    ) -> Result<FxHashMap<ServiceUuid, Vec<TransferMove>>, sqlx::Error> {
        let mut history: FxHashMap<ServiceUuid, Vec<TransferMove>> = FxHashMap::default();

        if services.is_empty() {
            return Ok(history);
        }

        let uuids: Vec<Uuid> = services.iter().copied().map(ServiceUuid::into_uuid).collect();

        let moves = query_as::<Postgres, TransferMove>(LIST_SERVICE_HISTORY_SQL)
            .bind(uuids)
            .bind(owner.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        tracing::Span::current().record("transfer_count", moves.len());

        for movement in moves {
            history
                .entry(movement.log.service_uuid)
                .or_default()
                .push(movement);
        }

        Ok(history)
    }

    #[tracing::instrument(
        name = "transfers.repository.list_transfer_logs",
        skip(self, tx),
        fields(owner_uuid = %owner, transfer_count = tracing::field::Empty),
        err
    )]
    pub(crate) async fn list_transfer_logs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        range: ChangedRange,
        location: Option<LocationUuid>,
        page: PageRequest,
    ) -> Result<Vec<TransferLogEntry>, sqlx::Error> {
        let entries = query_as::<Postgres, TransferLogEntry>(LIST_TRANSFER_LOGS_SQL)
            .bind(owner.into_uuid())
            .bind(range.from.map(SqlxTimestamp::from))
            .bind(range.until.map(SqlxTimestamp::from))
            .bind(location.map(LocationUuid::into_uuid))
            .bind(page.sql_limit())
            .bind(page.sql_offset())
            .fetch_all(&mut **tx)
            .await?;

        tracing::Span::current().record("transfer_count", entries.len());

        Ok(entries)
    }

    pub(crate) async fn count_transfer_logs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        range: ChangedRange,
        location: Option<LocationUuid>,
    ) -> Result<u64, sqlx::Error> {
        let total: i64 = query_scalar(COUNT_TRANSFER_LOGS_SQL)
            .bind(owner.into_uuid())
            .bind(range.from.map(SqlxTimestamp::from))
            .bind(range.until.map(SqlxTimestamp::from))
            .bind(location.map(LocationUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(total).map_err(|e| sqlx::Error::Decode(Box::new(e)))
    }
}

impl<'r> FromRow<'r, PgRow> for TransferLogRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: TransferLogUuid::from_uuid(row.try_get("uuid")?),
            service_uuid: ServiceUuid::from_uuid(row.try_get("service_uuid")?),
            from_location_uuid: LocationUuid::from_uuid(row.try_get("from_location_uuid")?),
            to_location_uuid: LocationUuid::from_uuid(row.try_get("to_location_uuid")?),
            changed_at: row.try_get::<SqlxTimestamp, _>("changed_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TransferMove {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            log: TransferLogRecord::from_row(row)?,
            from_location_name: row.try_get("from_location_name")?,
            to_location_name: row.try_get("to_location_name")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TransferLogEntry {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            movement: TransferMove::from_row(row)?,
            invoice_number: row.try_get("invoice_number")?,
            product: row.try_get("product")?,
            client_name: row.try_get("client_name")?,
        })
    }
}
