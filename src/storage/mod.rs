pub mod migrations;
pub mod sqlite;

use crate::error::StoreError;
use deadpool_sqlite::Pool;
use rusqlite::Connection;
use std::time::Duration;

/// How long a pooled connection waits on a locked database before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `f` on a pooled connection's blocking thread, after its per-connection
/// PRAGMAs.
pub async fn interact<F, T>(pool: &Pool, f: F) -> Result<T, StoreError>
where
    F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let conn = pool.get().await?;
    let result = conn
        .interact(move |conn| {
            sqlite::apply_connection_pragmas(conn)?;
            f(conn)
        })
        .await??;
    Ok(result)
}
