use mysql::prelude::*;
use mysql::{PooledConn, Row};

use crate::connection::Connection;

/// Borrows a pooled MySQL connection.
pub struct MySqlConnection<'a> {
    conn: &'a mut PooledConn,
}

impl<'a> MySqlConnection<'a> {
    pub fn new(conn: &'a mut PooledConn) -> Self {
        Self { conn }
    }
}

impl Connection for MySqlConnection<'_> {
    type Error = mysql::Error;

    fn begin_transaction(&mut self) -> Result<(), Self::Error> {
        self.conn.query_drop("START TRANSACTION")
    }

    fn execute_batch(&mut self, sql: &str) -> Result<(), Self::Error> {
        self.conn.query_drop(sql)
    }

    fn query_exists(&mut self, sql: &str) -> Result<bool, Self::Error> {
        let row: Option<Row> = self.conn.query_first(sql)?;
        Ok(row.is_some())
    }

    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>, Self::Error> {
        let rows: Vec<Row> = self.conn.query(sql)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| row.get::<Option<String>, usize>(i).flatten().unwrap_or_default())
                    .collect()
            })
            .collect())
    }
}
