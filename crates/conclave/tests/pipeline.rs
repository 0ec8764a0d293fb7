//! Wires config, data source and meeting the way the binary does.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use conclave::cache::SqliteReader;
use conclave::models::cache_schema::{key_patterns, CacheRow};
use conclave::models::{Action, DateRange, MarketSnapshot, PriceBar};

fn bars(closes: impl Iterator<Item = f64>) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    closes
        .enumerate()
        .map(|(i, c)| PriceBar::from_close(start + Duration::days(i as i64), c))
        .collect()
}

fn write_snapshots(dir: &std::path::Path) -> std::path::PathBuf {
    let snapshots = vec![
        MarketSnapshot {
            bars: bars((0..60).map(|i| 50.0 + i as f64 * 0.5)),
            ..MarketSnapshot::empty("UP")
        },
        MarketSnapshot {
            bars: bars((0..60).map(|_| 20.0)),
            ..MarketSnapshot::empty("FLAT")
        },
    ];
    let path = dir.join("snapshots.json");
    std::fs::write(&path, serde_json::to_string(&snapshots).unwrap()).unwrap();
    path
}

#[tokio::test]
async fn snapshot_file_to_decisions() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_snapshots(dir.path());

    let config = conclave::load_config(None).unwrap();
    let source = conclave::snapshot_source(&input).unwrap();
    let symbols = source.symbols();
    let meeting = conclave::build_meeting(config, Arc::new(source));
    let outcome = conclave::run(&meeting, &symbols, DateRange::default()).await;

    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.decisions["UP"].decision.action(), Action::Buy);
    assert_eq!(outcome.decisions["FLAT"].decision.action(), Action::Hold);

    let json: serde_json::Value = serde_json::to_value(&outcome.decisions).unwrap();
    for field in [
        "symbol",
        "as_of",
        "composite_score",
        "orders",
        "max_gross_exposure",
        "notes",
        "agent_reports",
        "backtest",
    ] {
        assert!(json["UP"].get(field).is_some(), "missing {field}");
    }
    assert!(json["UP"]["backtest"]["sharpe_ratio"].is_number());
}

#[tokio::test]
async fn date_range_trims_history_below_minimum() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_snapshots(dir.path());

    let meeting = conclave::build_meeting(
        conclave::load_config(None).unwrap(),
        Arc::new(conclave::snapshot_source(&input).unwrap()),
    );
    let range = DateRange::new(NaiveDate::from_ymd_opt(2024, 4, 15), None);
    let outcome = conclave::run(&meeting, &["UP".to_string()], range).await;
    assert!(outcome.failures["UP"].contains("Insufficient history"));
}

#[tokio::test]
async fn config_file_changes_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_snapshots(dir.path());
    let config_path = dir.path().join("conclave.toml");
    std::fs::write(&config_path, "[synthesis]\nbuy_threshold = 0.9\n").unwrap();

    let config = conclave::load_config(Some(&config_path)).unwrap();
    assert_eq!(config.synthesis.sell_threshold, -0.15);
    let meeting = conclave::build_meeting(
        config,
        Arc::new(conclave::snapshot_source(&input).unwrap()),
    );
    let outcome = conclave::run(&meeting, &["UP".to_string()], DateRange::default()).await;
    assert_eq!(outcome.decisions["UP"].decision.action(), Action::Hold);
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("bad.toml");
    std::fs::write(&config_path, "[synthesis]\nsell_threshold = 0.2\n").unwrap();
    let err = conclave::load_config(Some(&config_path)).unwrap_err();
    assert!(format!("{err:#}").contains("sell_threshold"));
}

#[tokio::test]
async fn sqlite_cache_to_decisions() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cache.db");
    let db_path = db_path.to_str().unwrap().to_string();

    let writer = SqliteReader::create(&db_path).unwrap();
    let now = Utc::now();
    writer
        .insert(&CacheRow {
            key: key_patterns::daily_bars("UP"),
            category: "market_data".to_string(),
            value_json: serde_json::to_string(&bars((0..60).map(|i| 50.0 + i as f64))).unwrap(),
            source: "test".to_string(),
            symbol: Some("UP".to_string()),
            created_at: now.to_rfc3339(),
            expires_at: (now + Duration::hours(1)).to_rfc3339(),
            updated_at: now.to_rfc3339(),
        })
        .unwrap();
    drop(writer);

    let mut config = conclave::load_config(None).unwrap();
    config.cache.sqlite_path = db_path;
    let source = conclave::cache_source(&config.cache).unwrap();
    let meeting = conclave::build_meeting(config, source);
    let outcome = conclave::run(&meeting, &["UP".to_string()], DateRange::default()).await;

    assert_eq!(outcome.decisions["UP"].decision.action(), Action::Buy);
}

#[test]
fn missing_cache_file_is_an_error() {
    let mut config = conclave::load_config(None).unwrap();
    config.cache.sqlite_path = "/nonexistent/dir/cache.db".to_string();
    assert!(conclave::cache_source(&config.cache).is_err());
}
