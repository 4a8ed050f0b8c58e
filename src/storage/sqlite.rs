use crate::academic::{CounterKind, LAB_SUBJECTS, NOTE_SUBJECTS};
use crate::config::DatabaseConfig;
use deadpool_sqlite::{Config, Pool, PoolConfig, Runtime};
use rusqlite::{params, Connection};

/// Apply SQLite PRAGMAs. WAL mode persists in the database file, so it only
/// needs to run once at startup.
pub fn apply_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    apply_connection_pragmas(conn)
}

/// PRAGMAs that reset on every new connection. Run before each pooled call.
pub fn apply_connection_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(crate::storage::BUSY_TIMEOUT)?;
    conn.execute_batch(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA temp_store = MEMORY;
        ",
    )
}

/// Create a deadpool-sqlite connection pool.
pub fn create_pool(config: &DatabaseConfig) -> Result<Pool, deadpool_sqlite::CreatePoolError> {
    let db_path = config.path.clone();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if db_path.exists() {
            if let Err(e) =
                std::fs::set_permissions(&db_path, std::fs::Permissions::from_mode(0o600))
            {
                tracing::warn!(error = %e, "failed to set database file permissions");
            }
        }
    }

    let mut cfg = Config::new(db_path);
    cfg.pool = Some(PoolConfig::new(config.pool_size.max(1)));
    cfg.create_pool(Runtime::Tokio1)
}

/// Insert a zero row for every routable subject and lab so increments always
/// find their row. Existing counts are left alone.
pub fn seed_counters(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO subject_counters (kind, code, count) VALUES (?1, ?2, 0)",
    )?;
    for (kind, table) in [
        (CounterKind::Note, NOTE_SUBJECTS),
        (CounterKind::Lab, LAB_SUBJECTS),
    ] {
        for (_, code) in table {
            stmt.execute(params![kind.as_str(), code])?;
        }
    }
    Ok(())
}

/// Prepare a fresh or existing database: PRAGMAs, migrations, counter seeds.
pub fn init_connection(conn: &Connection) -> rusqlite::Result<()> {
    apply_pragmas(conn)?;
    crate::storage::migrations::run_migrations(conn)?;
    seed_counters(conn)?;
    Ok(())
}

/// Initialize the pool: get a connection and run [`init_connection`] on it.
pub async fn init_pool(pool: &Pool) -> Result<(), crate::error::StoreError> {
    crate::storage::interact(pool, |conn| init_connection(conn)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_pooled_connection_gets_pragmas() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut cfg = Config::new(tmp.path());
        cfg.pool = Some(PoolConfig::new(4));
        let pool = cfg.create_pool(Runtime::Tokio1).unwrap();
        init_pool(&pool).await.unwrap();

        // Hold three so the next call lands on a connection init never touched.
        let mut held = Vec::new();
        for _ in 0..3 {
            held.push(pool.get().await.unwrap());
        }

        let (foreign_keys, busy_timeout): (i64, i64) = crate::storage::interact(&pool, |conn| {
            let fk = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
            let bt = conn.query_row("PRAGMA busy_timeout", [], |row| row.get(0))?;
            Ok((fk, bt))
        })
        .await
        .unwrap();
        assert_eq!(foreign_keys, 1);
        assert_eq!(busy_timeout, 5000);

        let journal: String = crate::storage::interact(&pool, |conn| {
            conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
        })
        .await
        .unwrap();
        assert_eq!(journal, "wal");
        drop(held);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_connection(&conn).unwrap();
        conn.execute(
            "UPDATE subject_counters SET count = 7 WHERE kind = 'note' AND code = 'math1'",
            [],
        )
        .unwrap();

        seed_counters(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT count FROM subject_counters WHERE kind = 'note' AND code = 'math1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 7);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM subject_counters", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows as usize, NOTE_SUBJECTS.len() + LAB_SUBJECTS.len());
    }
}
