use postgres::Client;

use crate::connection::Connection;

/// Borrows a connected postgres client. The database is the one the client
/// connected to.
pub struct PostgresConnection<'a> {
    client: &'a mut Client,
}

impl<'a> PostgresConnection<'a> {
    pub fn new(client: &'a mut Client) -> Self {
        Self { client }
    }
}

impl Connection for PostgresConnection<'_> {
    type Error = postgres::Error;

    fn execute_batch(&mut self, sql: &str) -> Result<(), Self::Error> {
        self.client.batch_execute(sql)
    }

    fn query_exists(&mut self, sql: &str) -> Result<bool, Self::Error> {
        Ok(!self.client.query(sql, &[])?.is_empty())
    }

    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>, Self::Error> {
        let rows = self.client.query(sql, &[])?;
        rows.iter()
            .map(|row| (0..row.len()).map(|i| row.try_get::<_, String>(i)).collect())
            .collect()
    }
}
