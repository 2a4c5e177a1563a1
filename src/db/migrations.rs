//! Snapshot store initialization and schema migrations.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::{debug, info};

const TABLES: &[&str] = &[
    "balances",
    "trades",
    "open_orders",
    "tickers",
    "market_caps",
    "strategies",
    "asset_metrics",
];

/// Open (creating if needed) the SQLite snapshot store and apply the schema.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _meta| Box::pin(async move { configure_pragmas_conn(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    run_migrations(&pool).await?;

    info!("Snapshot store ready at {}", db_path);
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema_sql = include_str!("schema.sql");

    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    info!("Schema applied ({} tables)", TABLES.len());
    Ok(())
}

async fn configure_pragmas_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Row;

    // journal_mode returns the mode actually set
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);
    debug!("SQLite journal_mode: {}", journal_mode);

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_db_path(temp_dir: &TempDir) -> String {
        temp_dir
            .path()
            .join("snapshots.db")
            .to_string_lossy()
            .to_string()
    }

    #[tokio::test]
    async fn test_init_db_creates_every_table() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_db_path(&temp_dir);
        let pool = init_db(&db_path).await.expect("init_db failed");
        assert!(Path::new(&db_path).exists());

        for table in TABLES {
            let result: (String,) =
                sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name=?")
                    .bind(table)
                    .fetch_one(&pool)
                    .await
                    .unwrap_or_else(|e| panic!("table {} missing: {}", table, e));
            assert_eq!(&result.0, table);
        }
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_db_path(&temp_dir))
            .await
            .expect("init_db failed");

        run_migrations(&pool)
            .await
            .expect("second migration run failed");
    }

    #[tokio::test]
    async fn test_init_db_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("nested")
            .join("store.db")
            .to_string_lossy()
            .to_string();
        init_db(&db_path).await.expect("init_db failed");
        assert!(Path::new(&db_path).exists());
    }
}
