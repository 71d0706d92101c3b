/// Database migration runner
///
/// Migrations live in the `migrations/` directory at the workspace root
/// and are applied at startup with sqlx's embedded migrator. The schema
/// declares the generated `tsvector` search columns and their GIN indexes;
/// the application never writes those columns.

use sqlx::postgres::PgPool;
use tracing::info;

/// Runs all pending database migrations
///
/// Safe to call on every startup; already-applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    sqlx::migrate!("../migrations").run(pool).await?;

    info!("Database migrations up to date");
    Ok(())
}
