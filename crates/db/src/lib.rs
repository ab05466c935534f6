use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub mod entities;
pub mod models;
pub mod types;

pub use sea_orm::DbErr;

pub type DbPool = DatabaseConnection;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct DBService {
    pub pool: DbPool,
}

impl DBService {
    /// Connects to `database_url` and brings the schema up to date.
    pub async fn connect(database_url: &str) -> Result<DBService, DbErr> {
        let mut options = ConnectOptions::new(database_url.to_owned());
        options
            .connect_timeout(CONNECT_TIMEOUT)
            .sqlx_logging(false);
        // Every pooled connection to an in-memory database sees its own copy.
        if database_url.contains(":memory:") {
            options.max_connections(1);
        }

        let pool = Database::connect(options).await?;
        db_migration::Migrator::up(&pool, None).await?;
        tracing::debug!("Database migrations applied");

        Ok(DBService { pool })
    }
}
