use sea_orm_migration::cli;

/// Standalone migration runner. Requires `DATABASE_URL`; unlike the server it has no default database.
#[tokio::main]
async fn main() {
    cli::run_cli(db_migration::Migrator).await;
}
