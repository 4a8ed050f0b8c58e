pub mod filter;
pub mod page;

pub use filter::Filter;
pub use page::{PageMeta, PageParams, Pagination};

use rusqlite::{params_from_iter, Connection, Row};

/// Run the COUNT query and the paginated data query over the same predicate.
///
/// `table`, `columns` and `order_by` are trusted SQL fragments chosen by the
/// caller; only filter values and pagination are bound.
pub fn fetch_page<T, F>(
    conn: &Connection,
    table: &str,
    columns: &str,
    filter: &Filter,
    order_by: &str,
    pagination: Pagination,
    map_row: F,
) -> rusqlite::Result<(Vec<T>, PageMeta)>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let count_sql = format!("SELECT COUNT(*) FROM {table} WHERE {}", filter.sql());
    let total: i64 = conn.query_row(&count_sql, params_from_iter(filter.binds()), |row| {
        row.get(0)
    })?;

    let n = filter.binds().len();
    let data_sql = format!(
        "SELECT {columns} FROM {table} WHERE {} ORDER BY {order_by} LIMIT ?{} OFFSET ?{}",
        filter.sql(),
        n + 1,
        n + 2
    );
    let mut binds = filter.binds().to_vec();
    binds.push(pagination.limit.into());
    binds.push(pagination.offset().into());

    let mut stmt = conn.prepare(&data_sql)?;
    let rows = stmt
        .query_map(params_from_iter(binds.iter()), map_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok((rows, PageMeta::new(total, pagination)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL, n INTEGER NOT NULL);")
            .unwrap();
        for i in 0..12 {
            let name = if i % 2 == 0 { "even" } else { "odd" };
            conn.execute(
                "INSERT INTO t (name, n) VALUES (?1, ?2)",
                rusqlite::params![name, i],
            )
            .unwrap();
        }
        conn
    }

    #[test]
    fn test_count_ignores_pagination() {
        let conn = setup();
        let filter = Filter::new().eq("name", Some("even"));
        let (rows, meta) = fetch_page(
            &conn,
            "t",
            "n",
            &filter,
            "n DESC",
            Pagination::resolve(Some(2), Some(4), 100),
            |row| row.get::<_, i64>(0),
        )
        .unwrap();
        assert_eq!(rows, vec![2, 0]);
        assert_eq!(meta.total, 6);
        assert_eq!(meta.total_pages, 2);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let conn = setup();
        let (rows, meta) = fetch_page(
            &conn,
            "t",
            "n",
            &Filter::new(),
            "n",
            Pagination::resolve(Some(9), Some(5), 100),
            |row| row.get::<_, i64>(0),
        )
        .unwrap();
        assert!(rows.is_empty());
        assert_eq!(meta.total, 12);
        assert_eq!(meta.current_page, 9);
    }
}
