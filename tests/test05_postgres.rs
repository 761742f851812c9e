#![cfg(feature = "postgres")]

use std::sync::{Arc, Mutex};

use sql_hooks::prelude::*;

/// Runs only when `SQL_HOOKS_PG_DSN` points at a reachable server.
fn pg_dsn() -> Option<String> {
    std::env::var("SQL_HOOKS_PG_DSN").ok().filter(|dsn| !dsn.trim().is_empty())
}

#[tokio::test]
async fn postgres_operations_run_through_interceptors() -> Result<(), Box<dyn std::error::Error>> {
    let Some(dsn) = pg_dsn() else {
        return Ok(());
    };

    let calls: Arc<Mutex<Vec<String>>> = Arc::default();
    let probe = {
        let calls = Arc::clone(&calls);
        interceptor(move |dsn: &DsnInfo, name: &str, _config: &Config| {
            assert_eq!(dsn.dialect, DatabaseType::Postgres);
            let calls = Arc::clone(&calls);
            let name = name.to_string();
            layer(move |next: Handler| {
                handler_fn(move |scope: Scope| {
                    let next = Arc::clone(&next);
                    calls.lock().unwrap().push(name.clone());
                    async move { next(scope).await }
                })
            })
        })
    };

    let config = Config::new(dsn)
        .with_max_open_conns(2)
        .with_interceptor(probe)
        .with_interceptor(log_interceptor());
    let db = open("postgresql", config).await?;
    assert_eq!(db.pool_limits().max_open, 2);

    db.execute_batch(
        "DROP TABLE IF EXISTS sql_hooks_pg_test;
         CREATE TABLE sql_hooks_pg_test (id BIGINT PRIMARY KEY, name TEXT NOT NULL);",
    )
    .await?;
    db.create(
        "INSERT INTO sql_hooks_pg_test (id, name) VALUES ($1, $2)",
        &[RowValues::Int(1), RowValues::Text("alice".into())],
    )
    .await?;
    let row = db
        .find_one("SELECT name FROM sql_hooks_pg_test WHERE id = $1", &[RowValues::Int(1)])
        .await?;
    assert_eq!(row.get("name").and_then(RowValues::as_text), Some("alice"));
    assert_eq!(
        db.delete("DELETE FROM sql_hooks_pg_test WHERE id = $1", &[RowValues::Int(1)]).await?,
        1
    );
    db.execute_batch("DROP TABLE sql_hooks_pg_test").await?;

    assert_eq!(
        *calls.lock().unwrap(),
        vec!["engine:create", "engine:query", "engine:delete"]
    );
    Ok(())
}

#[tokio::test]
async fn unreachable_postgres_surfaces_driver_error() {
    let config = Config::new("host=127.0.0.1 port=1 user=nobody dbname=none connect_timeout=1");
    let err = open("pg", config).await.unwrap_err();
    assert!(matches!(err, SqlHooksError::PostgresError(_)), "got {err:?}");
}
