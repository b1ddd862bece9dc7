//! Transfer logs service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        owners::OwnerUuid,
        pagination::Page,
        transfers::{
            data::TransferLogsFilter, errors::TransferLogsServiceError,
            records::TransferLogEntry, repository::PgTransferLogsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgTransferLogsService {
    db: Db,
    repository: PgTransferLogsRepository,
}

impl PgTransferLogsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgTransferLogsRepository::new(),
        }
    }
}

#[async_trait]
impl TransferLogsService for PgTransferLogsService {
    #[tracing::instrument(
        name = "transfers.service.list_transfer_logs",
        skip(self, filter),
        fields(
            owner_uuid = %owner,
            page = filter.page.page,
            limit = filter.page.limit,
            total = tracing::field::Empty
        ),
        err
    )]
    async fn list_transfer_logs(
        &self,
        owner: OwnerUuid,
        filter: TransferLogsFilter,
    ) -> Result<Page<TransferLogEntry>, TransferLogsServiceError> {
        filter.page.validate()?;

        if filter.has_inverted_dates() {
            return Err(TransferLogsServiceError::InvalidDateRange);
        }

        let range = filter
            .changed_range()
            .map_err(TransferLogsServiceError::DateOutOfRange)?;

        let mut tx = self.db.begin_owner_transaction(owner).await?;

        let entries = self
            .repository
            .list_transfer_logs(&mut tx, owner, range, filter.location, filter.page)
            .await?;

        let total = self
            .repository
            .count_transfer_logs(&mut tx, owner, range, filter.location)
            .await?;

        tx.commit().await?;

        tracing::Span::current().record("total", total);

        Ok(Page::new(entries, total, filter.page))
    }
}

#[automock]
#[async_trait]
pub trait TransferLogsService: Send + Sync {
    /// Audit listing of moves across the owner's services, newest first.
    async fn list_transfer_logs(
        &self,
        owner: OwnerUuid,
        filter: TransferLogsFilter,
    ) -> Result<Page<TransferLogEntry>, TransferLogsServiceError>;
}
