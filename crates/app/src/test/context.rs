//! Test context for service-level integration tests.

use std::sync::Arc;

use jiff::{Span, Zoned, civil::Date};
use sqlx::{Connection, PgConnection, PgPool, query};

use crate::{
    database::Db,
    domain::{
        bookings::PgBookingsService,
        catalog::{
            CatalogService, CatalogServiceError, PgCatalogService,
            models::{HotelUuid, NewHotel, NewRoom, NewRoomType, RoomTypeUuid, RoomUuid},
        },
        payments::PgPaymentsService,
        tenants::{PgTenantsService, TenantsService, data::NewTenant, records::TenantUuid},
    },
    notifications::{Notifier, TracingNotifier},
};

use super::db::TestDb;

/// Name of the non-superuser app role used for RLS testing.
const APP_ROLE: &str = "parador_app_test";
const APP_ROLE_PASSWORD: &str = "parador_app_test_pass";

pub struct TestContext {
    pub db: TestDb,
    pub app_db: Db,
    /// Connection string for the non-superuser app role.
    pub app_database_url: String,
    pub tenant_uuid: TenantUuid,
    pub catalog: PgCatalogService,
    pub bookings: PgBookingsService,
    pub payments: PgPaymentsService,
}

/// Catalog rows seeded by [`TestContext::seed_room`].
pub(crate) struct SeededRoom {
    pub hotel: HotelUuid,
    pub room_type: RoomTypeUuid,
    pub room: RoomUuid,
    pub room_number: String,
}

/// A stay starting `start_in_days` from today and lasting `nights`.
pub(crate) fn future_dates(start_in_days: i64, nights: i64) -> (Date, Date) {
    let today = Zoned::now().date();
    let check_in = today.saturating_add(Span::new().days(start_in_days));
    let check_out = check_in.saturating_add(Span::new().days(nights));

    (check_in, check_out)
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;

        // Build a non-superuser app pool so RLS policies are enforced.
        // The superuser pool is only used for administrative setup (tenant creation).
        let (app_pool, app_database_url) = Self::setup_app_pool(&test_db).await;
        let app_db = Db::new(app_pool);

        let tenant_uuid = TenantUuid::new();

        PgTenantsService::new(test_db.pool().clone())
            .create_tenant(NewTenant {
                uuid: tenant_uuid,
                name: "Test Tenant".to_string(),
            })
            .await
            .expect("Failed to create default test tenant");

        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

        Self {
            catalog: PgCatalogService::new(app_db.clone()),
            bookings: PgBookingsService::new(app_db.clone(), Arc::clone(&notifier)),
            payments: PgPaymentsService::new(app_db.clone(), notifier),
            tenant_uuid,
            app_db,
            app_database_url,
            db: test_db,
        }
    }

    /// Create an additional tenant for RLS isolation tests.
    pub async fn create_tenant(&self, name: &str) -> TenantUuid {
        let uuid = TenantUuid::new();

        PgTenantsService::new(self.db.pool().clone())
            .create_tenant(NewTenant {
                uuid,
                name: name.to_string(),
            })
            .await
            .expect("Failed to create test tenant");

        uuid
    }

    /// Seed one active hotel holding a standard room type and room "101".
    pub async fn seed_room(
        &self,
        base_price: u64,
        max_occupancy: u16,
    ) -> Result<SeededRoom, CatalogServiceError> {
        let hotel = self
            .catalog
            .create_hotel(
                self.tenant_uuid,
                NewHotel {
                    uuid: HotelUuid::new(),
                    name: "Harborview Grand".to_string(),
                    is_active: true,
                },
            )
            .await?;

        let room_type = self
            .catalog
            .create_room_type(
                self.tenant_uuid,
                NewRoomType {
                    uuid: RoomTypeUuid::new(),
                    hotel_uuid: hotel.uuid,
                    name: "Standard".to_string(),
                    base_price,
                    max_occupancy,
                },
            )
            .await?;

        let room = self
            .catalog
            .create_room(
                self.tenant_uuid,
                NewRoom {
                    uuid: RoomUuid::new(),
                    hotel_uuid: hotel.uuid,
                    room_type_uuid: room_type.uuid,
                    room_number: "101".to_string(),
                },
            )
            .await?;

        Ok(SeededRoom {
            hotel: hotel.uuid,
            room_type: room_type.uuid,
            room: room.uuid,
            room_number: room.room_number,
        })
    }

    /// Add another room of the seeded type to the seeded hotel.
    pub async fn add_room(
        &self,
        seeded: &SeededRoom,
        room_number: &str,
    ) -> Result<RoomUuid, CatalogServiceError> {
        let room = self
            .catalog
            .create_room(
                self.tenant_uuid,
                NewRoom {
                    uuid: RoomUuid::new(),
                    hotel_uuid: seeded.hotel,
                    room_type_uuid: seeded.room_type,
                    room_number: room_number.to_string(),
                },
            )
            .await?;

        Ok(room.uuid)
    }

    /// Create a non-superuser role (once per server) and return a pool connected
    /// as it, together with the connection string it used.
    ///
    /// PostgreSQL superusers bypass RLS even with `FORCE ROW LEVEL SECURITY`, so service
    /// tests that exercise isolation must connect via this restricted role.
    async fn setup_app_pool(test_db: &TestDb) -> (PgPool, String) {
        // `superuser_url` points at the test database as the superuser.
        let su_url = &test_db.superuser_url;

        // Derive a base URL pointing at the `postgres` maintenance database for
        // server-level DDL (CREATE ROLE is server-scoped, not database-scoped).
        let postgres_url = su_url.rsplit_once('/').map(|x| x.0).unwrap_or(su_url);
        let postgres_url = format!("{postgres_url}/postgres");

        let mut server_conn = PgConnection::connect(&postgres_url)
            .await
            .expect("Failed to connect to postgres database for role setup");

        // Create the app role. Multiple parallel tests may race here; treat
        // "role already exists" (42710) or the underlying unique violation (23505)
        // as success, since the role is present either way.
        let create_result = query(&format!(
            "CREATE ROLE {APP_ROLE} WITH LOGIN PASSWORD '{APP_ROLE_PASSWORD}' \
               NOSUPERUSER NOCREATEDB NOCREATEROLE"
        ))
        .execute(&mut server_conn)
        .await;

        if let Err(sqlx::Error::Database(ref e)) = create_result {
            if !matches!(e.code().as_deref(), Some("42710") | Some("23505")) {
                create_result.expect("Failed to create app role");
            }
        } else {
            create_result.expect("Failed to create app role");
        }

        // Grant CONNECT on the test database.
        query(&format!(
            "GRANT CONNECT ON DATABASE \"{}\" TO {APP_ROLE}",
            test_db.name
        ))
        .execute(&mut server_conn)
        .await
        .expect("Failed to grant CONNECT on test database");

        server_conn
            .close()
            .await
            .expect("Failed to close server connection");

        // Within the test database, grant schema and table privileges.
        let mut db_conn = PgConnection::connect(su_url)
            .await
            .expect("Failed to connect to test database for privilege setup");

        for stmt in [
            format!("GRANT USAGE ON SCHEMA public TO {APP_ROLE}"),
            format!(
                "GRANT SELECT, INSERT, UPDATE, DELETE ON ALL TABLES IN SCHEMA public TO {APP_ROLE}"
            ),
            format!("GRANT USAGE, SELECT ON ALL SEQUENCES IN SCHEMA public TO {APP_ROLE}"),
        ] {
            query(&stmt)
                .execute(&mut db_conn)
                .await
                .expect("Failed to grant table privileges to app role");
        }

        db_conn
            .close()
            .await
            .expect("Failed to close db connection");

        // Connect as the non-superuser role.
        let app_url = su_url.replacen(
            "parador_test:parador_test_password",
            &format!("{APP_ROLE}:{APP_ROLE_PASSWORD}"),
            1,
        );

        let pool = PgPool::connect(&app_url)
            .await
            .expect("Failed to create app pool");

        (pool, app_url)
    }
}
