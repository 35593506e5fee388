//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        bookings::{BookingsService, PgBookingsService},
        catalog::{CatalogService, PgCatalogService},
        payments::{PaymentsService, PgPaymentsService},
        tenants::{PgTenantsService, TenantsService},
    },
    notifications::{Notifier, TracingNotifier},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub tenants: Arc<dyn TenantsService>,
    pub catalog: Arc<dyn CatalogService>,
    pub bookings: Arc<dyn BookingsService>,
    pub payments: Arc<dyn PaymentsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails or
    /// when the connected role is exempt from row-level security.
    pub async fn from_database_url(url: &str) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::ensure_rls_enforced_role(&pool)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool.clone());
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

        Ok(Self {
            tenants: Arc::new(PgTenantsService::new(pool)),
            catalog: Arc::new(PgCatalogService::new(db.clone())),
            bookings: Arc::new(PgBookingsService::new(db.clone(), Arc::clone(&notifier))),
            payments: Arc::new(PgPaymentsService::new(db, notifier)),
        })
    }
}
