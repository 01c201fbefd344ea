use rusqlite::Connection as RusqliteConnection;

use crate::connection::Connection;

/// Borrows a rusqlite connection. The database file is created when the
/// connection is opened, so it always exists.
pub struct SqliteConnection<'a> {
    conn: &'a RusqliteConnection,
}

impl<'a> SqliteConnection<'a> {
    pub fn new(conn: &'a RusqliteConnection) -> Self {
        Self { conn }
    }
}

impl Connection for SqliteConnection<'_> {
    type Error = rusqlite::Error;

    fn execute_batch(&mut self, sql: &str) -> Result<(), Self::Error> {
        self.conn.execute_batch(sql)
    }

    fn query_exists(&mut self, sql: &str) -> Result<bool, Self::Error> {
        self.conn.prepare(sql)?.exists([])
    }

    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>, Self::Error> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..columns)
                    .map(|i| row.get::<_, String>(i))
                    .collect::<Result<Vec<String>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
