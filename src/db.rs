use crate::config::AppConfig;
use crate::migrator::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Establishes a connection pool from the application configuration.
pub async fn establish_connection(config: &AppConfig) -> Result<DbPool, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    // SQLite serializes writers; a larger pool only produces lock errors.
    if config.database_url.starts_with("sqlite") {
        options.max_connections(1);
    }

    let db = Database::connect(options).await?;
    info!("Database connection established");
    Ok(db)
}

/// Applies all pending schema migrations.
pub async fn run_migrations(db: &DbPool) -> Result<(), DbErr> {
    info!("Running database migrations");
    Migrator::up(db, None).await?;
    info!("Migrations complete");
    Ok(())
}
