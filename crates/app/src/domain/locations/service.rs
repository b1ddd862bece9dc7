//! Locations service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::{Db, storage_now},
    domain::{
        locations::{
            data::{LocationUpdate, NewLocation},
            errors::LocationsServiceError,
            records::{LocationRecord, LocationSummary, LocationUuid},
            repository::PgLocationsRepository,
        },
        owners::OwnerUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgLocationsService {
    db: Db,
    repository: PgLocationsRepository,
}

impl PgLocationsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgLocationsRepository::new(),
        }
    }
}

#[async_trait]
impl LocationsService for PgLocationsService {
    #[tracing::instrument(
        name = "locations.service.list_locations",
        skip(self),
        fields(owner_uuid = %owner),
        err
    )]
    async fn list_locations(
        &self,
        owner: OwnerUuid,
        only_active: bool,
    ) -> Result<Vec<LocationSummary>, LocationsServiceError> {
        let mut tx = self.db.begin_owner_transaction(owner).await?;

        let locations = self
            .repository
            .list_location_summaries(&mut tx, owner, only_active)
            .await?;

        tx.commit().await?;

        Ok(locations)
    }

    #[tracing::instrument(
        name = "locations.service.get_location",
        skip(self),
        fields(owner_uuid = %owner, location_uuid = %location),
        err
    )]
    async fn get_location(
        &self,
        owner: OwnerUuid,
        location: LocationUuid,
    ) -> Result<LocationRecord, LocationsServiceError> {
        let mut tx = self.db.begin_owner_transaction(owner).await?;

        let location = self
            .repository
            .get_location(&mut tx, owner, location)
            .await?;

        tx.commit().await?;

        Ok(location)
    }

    #[tracing::instrument(
        name = "locations.service.create_location",
        skip(self, location),
        fields(owner_uuid = %owner),
        err
    )]
    async fn create_location(
        &self,
        owner: OwnerUuid,
        location: NewLocation,
    ) -> Result<LocationRecord, LocationsServiceError> {
        let location = location.sanitize()?;

        let mut tx = self.db.begin_owner_transaction(owner).await?;

        let created = self
            .repository
            .create_location(
                &mut tx,
                owner,
                &location.name,
                location.address.as_deref(),
                storage_now(),
            )
            .await?;

        tx.commit().await?;

        info!(location_uuid = %created.uuid, "created location");

        Ok(created)
    }

    #[tracing::instrument(
        name = "locations.service.update_location",
        skip(self, update),
        fields(owner_uuid = %owner, location_uuid = %location),
        err
    )]
    async fn update_location(
        &self,
        owner: OwnerUuid,
        location: LocationUuid,
        update: LocationUpdate,
    ) -> Result<LocationRecord, LocationsServiceError> {
        let update = update.sanitize()?;

        let mut tx = self.db.begin_owner_transaction(owner).await?;

        let updated = self
            .repository
            .update_location(
                &mut tx,
                owner,
                location,
                &update.name,
                update.address.as_deref(),
                storage_now(),
            )
            .await?;

        tx.commit().await?;

        info!(location_uuid = %updated.uuid, "updated location");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "locations.service.toggle_active",
        skip(self),
        fields(owner_uuid = %owner, location_uuid = %location),
        err
    )]
    async fn toggle_active(
        &self,
        owner: OwnerUuid,
        location: LocationUuid,
        active: bool,
    ) -> Result<LocationRecord, LocationsServiceError> {
        let mut tx = self.db.begin_owner_transaction(owner).await?;

        let updated = self
            .repository
            .set_location_active(&mut tx, owner, location, active, storage_now())
            .await?;

        tx.commit().await?;

        info!(location_uuid = %updated.uuid, active, "changed location activity");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "locations.service.delete_location",
        skip(self),
        fields(owner_uuid = %owner, location_uuid = %location),
        err
    )]
    async fn delete_location(
        &self,
        owner: OwnerUuid,
        location: LocationUuid,
    ) -> Result<(), LocationsServiceError> {
        let mut tx = self.db.begin_owner_transaction(owner).await?;

        // The row lock makes new references wait until this transaction ends.
        self.repository
            .lock_location(&mut tx, owner, location)
            .await?;

        let usage = self
            .repository
            .location_usage(&mut tx, owner, location)
            .await?;

        if usage.is_referenced() {
            return Err(LocationsServiceError::InUse);
        }

        let rows_affected = self
            .repository
            .delete_location(&mut tx, owner, location)
            .await?;

        if rows_affected == 0 {
            return Err(LocationsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(location_uuid = %location, "deleted location");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait LocationsService: Send + Sync {
    /// Lists the owner's locations, newest first, with usage aggregates.
    async fn list_locations(
        &self,
        owner: OwnerUuid,
        only_active: bool,
    ) -> Result<Vec<LocationSummary>, LocationsServiceError>;

    /// Retrieve a single location.
    async fn get_location(
        &self,
        owner: OwnerUuid,
        location: LocationUuid,
    ) -> Result<LocationRecord, LocationsServiceError>;

    /// Creates an active location whose normalized name is unique for the owner.
    async fn create_location(
        &self,
        owner: OwnerUuid,
        location: NewLocation,
    ) -> Result<LocationRecord, LocationsServiceError>;

    /// Replaces name and address of a location.
    async fn update_location(
        &self,
        owner: OwnerUuid,
        location: LocationUuid,
        update: LocationUpdate,
    ) -> Result<LocationRecord, LocationsServiceError>;

    /// Marks a location active or inactive. Services held there are untouched.
    async fn toggle_active(
        &self,
        owner: OwnerUuid,
        location: LocationUuid,
        active: bool,
    ) -> Result<LocationRecord, LocationsServiceError>;

    /// Deletes a location no service or transfer refers to.
    async fn delete_location(
        &self,
        owner: OwnerUuid,
        location: LocationUuid,
    ) -> Result<(), LocationsServiceError>;
}
