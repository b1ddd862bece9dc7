//! Test context for service-level integration tests.

use sqlx::{Connection, PgConnection, PgPool, error::DatabaseError, query};

use crate::{
    database::Db,
    domain::{
        locations::PgLocationsService, owners::OwnerUuid, services::PgServiceLifecycle,
        transfers::PgTransferLogsService,
    },
};

use super::db::{SUPERUSER, SUPERUSER_PASSWORD, TestDb};

/// Login role without superuser rights, so row-level security applies.
const APP_ROLE: &str = "warranty_app_test";
const APP_ROLE_PASSWORD: &str = "warranty_app_test_pass";

pub struct TestContext {
    pub db: TestDb,
    pub owner_uuid: OwnerUuid,
    pub locations: PgLocationsService,
    pub services: PgServiceLifecycle,
    pub transfer_logs: PgTransferLogsService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(Self::app_pool(&test_db).await);

        Self {
            locations: PgLocationsService::new(db.clone()),
            services: PgServiceLifecycle::new(db.clone()),
            transfer_logs: PgTransferLogsService::new(db),
            owner_uuid: OwnerUuid::new(),
            db: test_db,
        }
    }

    /// Pool connected as [`APP_ROLE`], granted just enough to run the services.
    async fn app_pool(test_db: &TestDb) -> PgPool {
        let maintenance_url = test_db
            .url
            .rsplit_once('/')
            .map_or_else(|| test_db.url.clone(), |(server, _)| format!("{server}/postgres"));

        let mut server = PgConnection::connect(&maintenance_url)
            .await
            .expect("Failed to connect for role setup");

        // Roles are cluster-wide and tests run in parallel: losing the race is fine.
        let created = query(&format!(
            "CREATE ROLE {APP_ROLE} WITH LOGIN PASSWORD '{APP_ROLE_PASSWORD}' \
             NOSUPERUSER NOCREATEDB NOCREATEROLE"
        ))
        .execute(&mut server)
        .await;

        if let Err(error) = created {
            let already_there = error
                .as_database_error()
                .and_then(DatabaseError::code)
                .is_some_and(|code| code == "42710" || code == "23505");

            assert!(already_there, "Failed to create app role: {error}");
        }

        query(&format!(
            "GRANT CONNECT ON DATABASE \"{}\" TO {APP_ROLE}",
            test_db.name
        ))
        .execute(&mut server)
        .await
        .expect("Failed to grant CONNECT");

        server.close().await.expect("Failed to close connection");

        let mut database = PgConnection::connect(&test_db.url)
            .await
            .expect("Failed to connect for grants");

        for grant in [
            format!("GRANT USAGE ON SCHEMA public TO {APP_ROLE}"),
            format!("GRANT SELECT, INSERT, UPDATE, DELETE ON ALL TABLES IN SCHEMA public TO {APP_ROLE}"),
        ] {
            query(&grant)
                .execute(&mut database)
                .await
                .expect("Failed to grant table privileges");
        }

        database.close().await.expect("Failed to close connection");

        let app_url = test_db.url.replacen(
            &format!("{SUPERUSER}:{SUPERUSER_PASSWORD}"),
            &format!("{APP_ROLE}:{APP_ROLE_PASSWORD}"),
            1,
        );

        PgPool::connect(&app_url)
            .await
            .expect("Failed to create app pool")
    }
}
