//! Locations Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    locations::{
        names::normalize_name,
        records::{LocationRecord, LocationSummary, LocationUsage, LocationUuid},
    },
    owners::OwnerUuid,
};

const CREATE_LOCATION_SQL: &str = include_str!("sql/create_location.sql");
const GET_LOCATION_SQL: &str = include_str!("sql/get_location.sql");
const LOCK_LOCATION_SQL: &str = include_str!("sql/lock_location.sql");
const UPDATE_LOCATION_SQL: &str = include_str!("sql/update_location.sql");
const SET_LOCATION_ACTIVE_SQL: &str = include_str!("sql/set_location_active.sql");
const DELETE_LOCATION_SQL: &str = include_str!("sql/delete_location.sql");
const LOCATION_USAGE_SQL: &str = include_str!("sql/location_usage.sql");
const LIST_LOCATION_SUMMARIES_SQL: &str = include_str!("sql/list_location_summaries.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgLocationsRepository;

impl PgLocationsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_location(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        name: &str,
        address: Option<&str>,
        now: Timestamp,
    ) -> Result<LocationRecord, sqlx::Error> {
        query_as::<Postgres, LocationRecord>(CREATE_LOCATION_SQL)
            .bind(LocationUuid::new().into_uuid())
            .bind(owner.into_uuid())
            .bind(name)
            .bind(normalize_name(name))
            .bind(address)
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_location(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        location: LocationUuid,
    ) -> Result<LocationRecord, sqlx::Error> {
        query_as::<Postgres, LocationRecord>(GET_LOCATION_SQL)
            .bind(location.into_uuid())
            .bind(owner.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch the location and hold a row lock until the transaction ends.
    pub(crate) async fn lock_location(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        location: LocationUuid,
    ) -> Result<LocationRecord, sqlx::Error> {
        query_as::<Postgres, LocationRecord>(LOCK_LOCATION_SQL)
            .bind(location.into_uuid())
            .bind(owner.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_location(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        location: LocationUuid,
        name: &str,
        address: Option<&str>,
        now: Timestamp,
    ) -> Result<LocationRecord, sqlx::Error> {
        query_as::<Postgres, LocationRecord>(UPDATE_LOCATION_SQL)
            .bind(location.into_uuid())
            .bind(owner.into_uuid())
            .bind(name)
            .bind(normalize_name(name))
            .bind(address)
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_location_active(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        location: LocationUuid,
        active: bool,
        now: Timestamp,
    ) -> Result<LocationRecord, sqlx::Error> {
        query_as::<Postgres, LocationRecord>(SET_LOCATION_ACTIVE_SQL)
            .bind(location.into_uuid())
            .bind(owner.into_uuid())
            .bind(active)
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_location(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        location: LocationUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_LOCATION_SQL)
            .bind(location.into_uuid())
            .bind(owner.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    #[tracing::instrument(
        name = "locations.repository.location_usage",
        skip(self, tx),
        fields(owner_uuid = %owner, location_uuid = %location),
        err
    )]
    pub(crate) async fn location_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        location: LocationUuid,
    ) -> Result<LocationUsage, sqlx::Error> {
        let row = query(LOCATION_USAGE_SQL)
            .bind(location.into_uuid())
            .bind(owner.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        usage_from_row(&row)
    }

    #[tracing::instrument(
        name = "locations.repository.list_location_summaries",
        skip(self, tx),
        fields(owner_uuid = %owner, location_count = tracing::field::Empty),
        err
    )]
    pub(crate) async fn list_location_summaries(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: OwnerUuid,
        only_active: bool,
    ) -> Result<Vec<LocationSummary>, sqlx::Error> {
        let rows = query(LIST_LOCATION_SUMMARIES_SQL)
            .bind(owner.into_uuid())
            .bind(only_active)
            .fetch_all(&mut **tx)
            .await?;

        tracing::Span::current().record("location_count", rows.len());

        rows.iter()
            .map(|row| Ok(usage_from_row(row)?.summarize(LocationRecord::from_row(row)?)))
            .collect()
    }
}

fn usage_from_row(row: &PgRow) -> Result<LocationUsage, sqlx::Error> {
    Ok(LocationUsage {
        service_count: count_column(row, "service_count")?,
        active_count: count_column(row, "active_count")?,
        completed_count: count_column(row, "completed_count")?,
        transfer_count: count_column(row, "transfer_count")?,
    })
}

fn count_column(row: &PgRow, column: &str) -> Result<u64, sqlx::Error> {
    let count: i64 = row.try_get(column)?;

    u64::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for LocationRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: LocationUuid::from_uuid(row.try_get("uuid")?),
            owner_uuid: OwnerUuid::from_uuid(row.try_get("owner_uuid")?),
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
