//! Database Connections
//!
//! Every tenant-scoped table carries a forced row-level-security policy, so
//! all domain work must run inside a transaction opened with
//! [`Db::begin_tenant_transaction`]. The policy reads the tenant UUID back
//! out of the `app.current_tenant_uuid` setting, which is scoped to the
//! transaction that set it.

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::tenants::records::TenantUuid;

/// Embedded schema migrations, applied by `db migrate` and the test harness.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Connects to the database at `url`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new().connect(url).await
}

/// Verifies the pool's role cannot bypass row-level security.
///
/// Superusers and `BYPASSRLS` roles skip forced policies silently, so a
/// service running as one would read every tenant's rows.
///
/// # Errors
///
/// Returns an error when the role cannot be inspected or is exempt from
/// RLS.
pub async fn ensure_rls_enforced_role(pool: &PgPool) -> Result<(), sqlx::Error> {
    let (is_superuser, bypasses_rls): (bool, bool) =
        sqlx::query_as("SELECT rolsuper, rolbypassrls FROM pg_roles WHERE rolname = current_user")
            .fetch_one(pool)
            .await?;

    if is_superuser || bypasses_rls {
        return Err(sqlx::Error::Configuration(
            "connected role is exempt from row-level security; connect as the app role".into(),
        ));
    }

    Ok(())
}

/// A cloneable handle to the connection pool that opens tenant-scoped
/// transactions.
#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Wraps a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begins a transaction with `app.current_tenant_uuid` set for the
    /// duration of the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the setting
    /// cannot be applied.
    pub async fn begin_tenant_transaction(
        &self,
        tenant_uuid: TenantUuid,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT set_config('app.current_tenant_uuid', $1, TRUE)")
            .bind(tenant_uuid.into_uuid().to_string())
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestDb;

    #[tokio::test]
    async fn tenant_transactions_carry_the_tenant_setting() -> TestResult {
        let db = TestDb::new().await;
        let tenant_uuid = crate::domain::tenants::records::TenantUuid::new();

        let handle = super::Db::new(db.pool().clone());
        let mut tx = handle.begin_tenant_transaction(tenant_uuid).await?;

        let current: String =
            sqlx::query_scalar("SELECT current_setting('app.current_tenant_uuid')")
                .fetch_one(&mut *tx)
                .await?;

        assert_eq!(current, tenant_uuid.to_string());

        Ok(())
    }

    // The container's bootstrap user is a superuser, which forced RLS
    // does not bind.
    #[tokio::test]
    async fn superuser_pools_are_refused_for_runtime_use() -> TestResult {
        let db = TestDb::new().await;

        let result = super::ensure_rls_enforced_role(db.pool()).await;

        assert!(result.is_err());

        Ok(())
    }
}
