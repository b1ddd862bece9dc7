//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        locations::{LocationsService, PgLocationsService},
        services::{PgServiceLifecycle, ServiceLifecycle},
        transfers::{PgTransferLogsService, TransferLogsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Process-wide services sharing one connection pool.
#[derive(Clone)]
pub struct AppContext {
    pub locations: Arc<dyn LocationsService>,
    pub services: Arc<dyn ServiceLifecycle>,
    pub transfer_logs: Arc<dyn TransferLogsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_db(Db::new(pool)))
    }

    #[must_use]
    pub fn from_db(db: Db) -> Self {
        Self {
            locations: Arc::new(PgLocationsService::new(db.clone())),
            services: Arc::new(PgServiceLifecycle::new(db.clone())),
            transfer_logs: Arc::new(PgTransferLogsService::new(db)),
        }
    }
}
