#![cfg(feature = "sqlite")]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sql_hooks::prelude::*;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn trace_ids(seen: &Arc<Mutex<Vec<Option<String>>>>) -> Interceptor {
    let seen = Arc::clone(seen);
    interceptor(move |_dsn: &DsnInfo, _name: &str, _config: &Config| {
        let seen = Arc::clone(&seen);
        layer(move |next: Handler| {
            handler_fn(move |scope: Scope| {
                let next = Arc::clone(&next);
                let seen = Arc::clone(&seen);
                async move {
                    let id = scope.context().and_then(QueryContext::trace_id).map(str::to_string);
                    seen.lock().unwrap().push(id);
                    next(scope).await
                }
            })
        })
    })
}

async fn open_db(dir: &TempDir, config: Config) -> Result<Db, SqlHooksError> {
    let path = dir.path().join("ctx.db").display().to_string();
    let mut config = config;
    config.dsn = path;
    let db = open("sqlite", config).await?;
    db.execute_batch("CREATE TABLE IF NOT EXISTS t (id INTEGER)").await?;
    Ok(db)
}

#[tokio::test]
async fn last_attached_context_wins() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut db = open_db(&dir, Config::default().with_interceptor(trace_ids(&seen))).await?;

    db.query("SELECT id FROM t", &[]).await?;
    db.with_context(QueryContext::new().with_trace_id("first"))
        .with_context(QueryContext::new().with_trace_id("second").with_label("tenant", "acme"));
    assert_eq!(db.context().and_then(QueryContext::trace_id), Some("second"));
    assert_eq!(db.context().and_then(|c| c.label("tenant")), Some("acme"));

    db.query("SELECT id FROM t", &[]).await?;
    let cleared = db.clear_context();
    assert_eq!(cleared.as_ref().and_then(QueryContext::trace_id), Some("second"));
    db.query("SELECT id FROM t", &[]).await?;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![None, Some("second".to_string()), None]
    );
    Ok(())
}

#[tokio::test]
async fn clones_do_not_share_the_context_slot() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let db = open_db(&dir, Config::default().with_interceptor(trace_ids(&seen))).await?;

    let request_a = db.scoped(QueryContext::new().with_trace_id("a"));
    let mut request_b = db.clone();
    request_b.with_context(QueryContext::new().with_trace_id("b"));

    request_a.query("SELECT id FROM t", &[]).await?;
    request_b.query("SELECT id FROM t", &[]).await?;
    db.query("SELECT id FROM t", &[]).await?;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some("a".to_string()), Some("b".to_string()), None]
    );
    assert!(db.context().is_none());
    Ok(())
}

#[tokio::test]
async fn cancelled_context_stops_the_call() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let db = open_db(&dir, Config::default()).await?;

    let token = CancellationToken::new();
    token.cancel();
    let cancelled = db.scoped(QueryContext::new().with_cancellation(token));
    let err = cancelled.create("INSERT INTO t (id) VALUES (1)", &[]).await.unwrap_err();
    assert!(matches!(err, SqlHooksError::Cancelled));

    assert!(db.query("SELECT id FROM t", &[]).await?.is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelling_mid_statement_reports_the_real_outcome() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let db = open_db(&dir, Config::default()).await?;
    db.execute_batch("CREATE TABLE big (n INTEGER)").await?;

    let token = CancellationToken::new();
    let request = db.scoped(QueryContext::new().with_cancellation(token.clone()));
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let inserted = request
        .create(
            "INSERT INTO big (n)
             WITH RECURSIVE seq(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM seq WHERE x < 500000)
             SELECT x FROM seq",
            &[],
        )
        .await?;
    canceller.await?;
    assert_eq!(inserted, 500_000);

    let count = db.find_one("SELECT COUNT(*) AS c FROM big", &[]).await?;
    assert_eq!(count.get("c").and_then(RowValues::as_int).copied(), Some(500_000));

    let err = request.query("SELECT n FROM big LIMIT 1", &[]).await.unwrap_err();
    assert!(matches!(err, SqlHooksError::Cancelled));
    Ok(())
}
