//! Database connection management

use jiff::{RoundMode, Timestamp, TimestampRound, Unit};
use sqlx::{PgPool, Postgres, Transaction, migrate::MigrateError, query};

use crate::domain::owners::OwnerUuid;

/// SQL used to set owner context for row-level security.
pub const SET_OWNER_CONTEXT_SQL: &str = "SELECT set_config('app.current_owner_uuid', $1, true)";

/// Shared storage handle injected into every service.
#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Wrap an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction and set owner context for RLS policies.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or setting owner context fails.
    pub async fn begin_owner_transaction(
        &self,
        owner: OwnerUuid,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        query(SET_OWNER_CONTEXT_SQL)
            .bind(owner.into_uuid().to_string())
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if any migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Current time at the precision `PostgreSQL` stores, rounded up so the
/// value is never earlier than the wall clock at the call.
pub(crate) fn storage_now() -> Timestamp {
    let now = Timestamp::now();

    now.round(
        TimestampRound::new()
            .smallest(Unit::Microsecond)
            .mode(RoundMode::Ceil),
    )
    .unwrap_or(now)
}
