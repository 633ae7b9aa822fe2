use std::str::FromStr;
use std::time::Duration;

use greenearth_core::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub type DbPool = sqlx::SqlitePool;

pub async fn connect_from_config(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    let url = normalize_url(database_url);
    let in_memory = url.contains(":memory:") || url.contains("mode=memory");

    let mut options = SqliteConnectOptions::from_str(&url)?
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(5000));
    if !in_memory {
        options = options.create_if_missing(true).journal_mode(SqliteJournalMode::Wal);
    }

    // Shared-cache memory databases lock per table, so they get one connection.
    let max_connections = if in_memory { 1 } else { max_connections.max(1) };
    let mut pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)));
    // An in-memory database lives only as long as its connection.
    if in_memory {
        pool = pool.min_connections(1).idle_timeout(None).max_lifetime(None);
    }

    pool.connect_with(options).await
}

/// Liveness check used by health and doctor.
pub async fn ping(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

fn normalize_url(database_url: &str) -> String {
    let trimmed = database_url.trim();
    if trimmed == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{connect_with_settings, normalize_url, ping};

    #[test]
    fn bare_memory_alias_is_expanded() {
        assert_eq!(normalize_url(":memory:"), "sqlite::memory:");
        assert_eq!(normalize_url(" sqlite://greenearth.db "), "sqlite://greenearth.db");
    }

    #[tokio::test]
    async fn in_memory_pool_answers_ping() {
        let pool = connect_with_settings(":memory:", 1, 5).await.expect("connect");
        ping(&pool).await.expect("ping");
    }
}
