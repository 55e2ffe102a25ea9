//! Execution seam between built statements and the database driver.

use crate::error::SqlResult;
use crate::param::ParamList;
use std::future::Future;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Row, Transaction};

/// The driver capability consumed by statement execution.
///
/// Implemented for [`tokio_postgres::Client`] and
/// [`tokio_postgres::Transaction`], so the same statement runs inside or
/// outside a transaction. Cancellation and timeouts belong to the caller's
/// runtime; nothing here retries or inspects deadlines.
pub trait GenericClient {
    /// Run a statement, returning the affected row count.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = SqlResult<u64>> + Send;

    /// Run a query, returning all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = SqlResult<Vec<Row>>> + Send;

    /// Run a query expected to return zero or one row.
    fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = SqlResult<Option<Row>>> + Send;

    /// Run a query expected to return exactly one row.
    fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = SqlResult<Row>> + Send;
}

impl GenericClient for Client {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<u64> {
        Ok(Client::execute(self, sql, params).await?)
    }

    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Vec<Row>> {
        Ok(Client::query(self, sql, params).await?)
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> SqlResult<Option<Row>> {
        Ok(Client::query_opt(self, sql, params).await?)
    }

    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Row> {
        Ok(Client::query_one(self, sql, params).await?)
    }
}

impl GenericClient for Transaction<'_> {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<u64> {
        Ok(Transaction::execute(self, sql, params).await?)
    }

    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Vec<Row>> {
        Ok(Transaction::query(self, sql, params).await?)
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> SqlResult<Option<Row>> {
        Ok(Transaction::query_opt(self, sql, params).await?)
    }

    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Row> {
        Ok(Transaction::query_one(self, sql, params).await?)
    }
}

/// A buildable statement with query helpers.
///
/// `to_sql` is the one place the placeholder dialect is applied; everything
/// below a statement compiles to raw `?` tokens.
pub trait Statement: Sync {
    /// Build the final SQL text and its bound arguments.
    fn to_sql(&self) -> SqlResult<(String, ParamList)>;

    /// Build and run, returning all rows.
    fn query<C>(&self, client: &C) -> impl Future<Output = SqlResult<Vec<Row>>> + Send
    where
        C: GenericClient + Sync,
    {
        async move {
            let (sql, params) = self.to_sql()?;
            client.query(&sql, &params.as_refs()).await
        }
    }

    /// Build and run, returning zero or one row.
    fn query_opt<C>(&self, client: &C) -> impl Future<Output = SqlResult<Option<Row>>> + Send
    where
        C: GenericClient + Sync,
    {
        async move {
            let (sql, params) = self.to_sql()?;
            client.query_opt(&sql, &params.as_refs()).await
        }
    }

    /// Build and run, returning exactly one row.
    fn query_one<C>(&self, client: &C) -> impl Future<Output = SqlResult<Row>> + Send
    where
        C: GenericClient + Sync,
    {
        async move {
            let (sql, params) = self.to_sql()?;
            client.query_one(&sql, &params.as_refs()).await
        }
    }
}

/// A statement that mutates rows and reports how many it touched.
pub trait Mutation: Statement {
    /// Build and run, returning the affected row count.
    fn execute<C>(&self, client: &C) -> impl Future<Output = SqlResult<u64>> + Send
    where
        C: GenericClient + Sync,
    {
        async move {
            let (sql, params) = self.to_sql()?;
            client.execute(&sql, &params.as_refs()).await
        }
    }
}
