use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

/// Creates a connection pool to the PostgreSQL database.
///
/// Reads `DATABASE_URL`, falling back to a local development database, and
/// `DATABASE_MAX_CONNECTIONS` for the pool size.
pub async fn create_connection_pool() -> Result<PgPool, sqlx::Error> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/plan_a".to_string());

    let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(10);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
}

/// Tests the database connection by executing a simple query.
pub async fn test_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    let row = sqlx::query("SELECT 1 as test").fetch_one(pool).await?;

    let test_value: i32 = row.get("test");
    log::debug!("Database connectivity check returned {}", test_value);

    Ok(())
}
