//! Cross-module statement tests.

use crate::*;
use std::sync::Mutex;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

#[test]
fn conjunctions_compose_end_to_end() {
    let (sql, args) = select()
        .column("id")
        .from("t")
        .and_where(
            And::new()
                .push(expr("a > ?").bind(15i32))
                .push(expr("b < ?").bind(20i32)),
        )
        .to_sql()
        .unwrap();
    assert_eq!(sql, "SELECT id FROM t WHERE (a > ? AND b < ?)");
    assert_eq!(args.len(), 2);
    assert_eq!(args.values()[0].downcast_ref::<i32>(), Some(&15));
    assert_eq!(args.values()[1].downcast_ref::<i32>(), Some(&20));
}

#[test]
fn deeply_nested_dollar_numbering_matches_argument_order() {
    let inner = select()
        .column("id")
        .from("orders")
        .and_where(expr("total > ?").bind(100i64))
        .and_where(EqPairs::new().pair("status", "paid"));
    let (sql, args) = StatementBuilder::new(Placeholder::Dollar)
        .update()
        .table("users")
        .set("flag", true)
        .set_select("last_order", inner)
        .and_where(expr("id = ?").bind(7i64))
        .to_sql()
        .unwrap();

    assert_eq!(
        sql,
        "UPDATE users SET flag = $1, last_order = \
         (SELECT id FROM orders WHERE total > $2 AND status = $3) \
         WHERE id = $4"
    );
    assert_eq!(args.len(), 4);
    assert_eq!(args.values()[0].downcast_ref::<bool>(), Some(&true));
    assert_eq!(args.values()[1].downcast_ref::<i64>(), Some(&100));
    assert_eq!(args.values()[3].downcast_ref::<i64>(), Some(&7));
}

#[test]
fn predicate_error_surfaces_through_the_statement() {
    let err = select()
        .column("id")
        .from("t")
        .and_where(Lt::new().pair("id", vec![1i32, 2]))
        .to_sql();
    assert!(matches!(err, Err(SqlError::InvalidComparison(_))));
}

#[test]
fn statement_factory_is_reusable() {
    let psql = StatementBuilder::new(Placeholder::Dollar);
    let (first, _) = psql.select().column("a").from("t").to_sql().unwrap();
    let (second, _) = psql
        .delete()
        .from("t")
        .and_where(expr("a = ?").bind(1i32))
        .to_sql()
        .unwrap();
    assert_eq!(first, "SELECT a FROM t");
    assert_eq!(second, "DELETE FROM t WHERE a = $1");
}

/// Records the SQL handed to the driver seam without a live connection.
struct RecordingClient {
    last: Mutex<(String, usize)>,
}

impl RecordingClient {
    fn new() -> Self {
        Self {
            last: Mutex::new((String::new(), 0)),
        }
    }

    fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) {
        *self.last.lock().unwrap() = (sql.to_string(), params.len());
    }

    fn last(&self) -> (String, usize) {
        self.last.lock().unwrap().clone()
    }
}

impl GenericClient for RecordingClient {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<u64> {
        self.record(sql, params);
        Ok(params.len() as u64)
    }

    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Vec<Row>> {
        self.record(sql, params);
        Ok(Vec::new())
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> SqlResult<Option<Row>> {
        self.record(sql, params);
        Ok(None)
    }

    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Row> {
        self.record(sql, params);
        Err(SqlError::InvalidStatement("recording stub holds no rows"))
    }
}

#[tokio::test]
async fn mutation_executes_the_built_sql() {
    let client = RecordingClient::new();
    let affected = StatementBuilder::new(Placeholder::Dollar)
        .update()
        .table("users")
        .set("name", "moe")
        .and_where(expr("id = ?").bind(1i64))
        .execute(&client)
        .await
        .unwrap();
    assert_eq!(affected, 2);
    assert_eq!(
        client.last(),
        ("UPDATE users SET name = $1 WHERE id = $2".to_string(), 2)
    );
}

#[tokio::test]
async fn query_forwards_sql_and_arguments() {
    let client = RecordingClient::new();
    let rows = select()
        .column("id")
        .from("users")
        .and_where(Eq::new().pair("id", vec![1i64, 2, 3]))
        .query(&client)
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(
        client.last(),
        ("SELECT id FROM users WHERE id IN (?,?,?)".to_string(), 3)
    );
}

#[tokio::test]
async fn build_errors_short_circuit_before_the_driver() {
    let client = RecordingClient::new();
    let err = select().from("t").query(&client).await;
    assert!(matches!(err, Err(SqlError::MissingClause(_))));
    assert_eq!(client.last().0, "");
}
