#![cfg(feature = "sqlite")]

use std::time::Duration;

use sql_hooks::prelude::*;
use sql_hooks::pool::DEFAULT_MAX_OPEN;
use tempfile::TempDir;

fn db_path(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).display().to_string()
}

#[tokio::test]
async fn pool_limits_follow_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config = Config::new(db_path(&dir, "limits.db"))
        .with_name("limits")
        .with_max_open_conns(4)
        .with_max_idle_conns(2)
        .with_conn_max_lifetime(Duration::from_secs(60))
        .with_conn_max_idle_time(Duration::from_secs(30))
        .with_run_mode(RunMode::Production);
    let db = open("sqlite3", config).await?;

    let limits = db.pool_limits();
    assert_eq!(limits.max_open, 4);
    assert_eq!(limits.max_idle, 2);
    assert_eq!(limits.max_lifetime, Some(Duration::from_secs(60)));
    assert_eq!(limits.max_idle_time, Some(Duration::from_secs(30)));
    assert_eq!(db.dialect(), DatabaseType::Sqlite);
    assert_eq!(db.name(), "limits");
    assert!(db.pool_state().connections <= 4);
    assert!(!db.log_mode());
    Ok(())
}

#[tokio::test]
async fn open_creates_no_idle_connections() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config = Config::new(db_path(&dir, "idle.db"))
        .with_max_open_conns(8)
        .with_max_idle_conns(6)
        .with_run_mode(RunMode::Production);
    let db = open("sqlite", config).await?;

    let state = db.pool_state();
    assert_eq!(state.connections, 0);
    assert_eq!(state.idle_connections, 0);

    db.execute_batch("CREATE TABLE t (id INTEGER)").await?;
    db.query("SELECT id FROM t", &[]).await?;
    let state = db.pool_state();
    assert!(state.connections >= 1);
    assert!(state.idle_connections <= 6);
    Ok(())
}

#[tokio::test]
async fn zero_values_keep_engine_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config = Config::new(db_path(&dir, "zero.db"))
        .with_max_open_conns(0)
        .with_max_idle_conns(50)
        .with_conn_max_lifetime(Duration::ZERO)
        .with_run_mode(RunMode::Production);
    let db = open("sqlite", config).await?;

    let limits = db.pool_limits();
    assert_eq!(limits.max_open, DEFAULT_MAX_OPEN);
    assert_eq!(limits.max_idle, DEFAULT_MAX_OPEN);
    assert_eq!(limits.max_lifetime, None);
    assert_eq!(limits.connect_timeout, None);
    Ok(())
}

#[tokio::test]
async fn development_mode_forces_statement_logging() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config = Config::new(db_path(&dir, "dev.db"))
        .with_debug(false)
        .with_run_mode(RunMode::Development);
    let db = open("sqlite", config).await?;
    assert!(db.log_mode());

    db.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)").await?;
    let inserted = db
        .create("INSERT INTO t (id, name) VALUES (?1, ?2)", &[RowValues::Int(1), RowValues::Text("a".into())])
        .await?;
    assert_eq!(inserted, 1);
    Ok(())
}

#[tokio::test]
async fn crud_through_the_engine() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let db = open("sqlite", Config::new(db_path(&dir, "crud.db"))).await?;
    db.execute_batch(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, score REAL);",
    )
    .await?;

    for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
        db.create(
            "INSERT INTO users (id, name, score) VALUES (?1, ?2, ?3)",
            &[RowValues::Int(id), RowValues::Text(name.into()), RowValues::Float(1.5)],
        )
        .await?;
    }

    let updated = db
        .update("UPDATE users SET score = ?1 WHERE id > ?2", &[RowValues::Float(9.0), RowValues::Int(1)])
        .await?;
    assert_eq!(updated, 2);

    let all = db.query("SELECT id, name FROM users ORDER BY id", &[]).await?;
    assert_eq!(all.results.len(), 3);
    assert_eq!(all.results[1].get("name").and_then(RowValues::as_text), Some("bob"));

    let carol = db
        .find_one("SELECT name, score FROM users WHERE id = ?1", &[RowValues::Int(3)])
        .await?;
    assert_eq!(carol.get("score").and_then(RowValues::as_float), Some(9.0));

    let missing = db
        .find_one("SELECT name FROM users WHERE id = ?1", &[RowValues::Int(99)])
        .await;
    assert!(matches!(missing, Err(ref e) if is_record_not_found(e)));

    assert!(db.row("SELECT name FROM users WHERE id = 99", &[]).await?.is_none());
    let rows = db.rows("SELECT id FROM users WHERE id < 3", &[]).await?;
    assert_eq!(rows.rows_affected, 2);

    let deleted = db.delete("DELETE FROM users WHERE id = ?1", &[RowValues::Int(1)]).await?;
    assert_eq!(deleted, 1);

    let empty = db.create("   ", &[]).await;
    assert!(matches!(empty, Err(SqlHooksError::InvalidSql(_))));

    let driver = db.query("SELECT nope FROM users", &[]).await;
    assert!(matches!(driver, Err(SqlHooksError::SqliteError(_))));
    Ok(())
}

#[tokio::test]
async fn open_rejects_bad_input() -> Result<(), Box<dyn std::error::Error>> {
    let err = open("mysql", Config::new("x.db")).await.unwrap_err();
    assert!(matches!(err, SqlHooksError::ConfigError(_)));

    let err = open("sqlite", Config::new("")).await.unwrap_err();
    assert!(matches!(err, SqlHooksError::ConfigError(_)));

    let dir = TempDir::new()?;
    let unreachable = dir.path().join("no/such/dir/app.db").display().to_string();
    let err = open(
        "sqlite",
        Config::new(unreachable).with_connect_timeout(Duration::from_secs(2)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SqlHooksError::SqliteError(_)), "got {err:?}");
    Ok(())
}
