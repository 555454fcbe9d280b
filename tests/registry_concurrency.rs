//! Connector registry under concurrent load
//!
//! First use of a type may race from many tasks; construction must still
//! happen once, and a slow type must not hold up the others.

use async_trait::async_trait;
use metaroute::models::ConnectionParams;
use metaroute::{ConnectorRegistry, MetaColumnInfo, MetadataConnector, MetadataError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

struct StaticConnector {
    type_id: String,
}

#[async_trait]
impl MetadataConnector for StaticConnector {
    fn type_id(&self) -> &str {
        &self.type_id
    }

    async fn get_connection(&self, _operator: &str, _params: &ConnectionParams) -> anyhow::Result<()> {
        Ok(())
    }

    async fn get_databases(
        &self,
        _creator: &str,
        _params: &ConnectionParams,
    ) -> anyhow::Result<Vec<String>> {
        Ok(vec![self.type_id.clone()])
    }

    async fn get_tables(
        &self,
        _creator: &str,
        _params: &ConnectionParams,
        _database: &str,
    ) -> anyhow::Result<Vec<String>> {
        Ok(vec![])
    }

    async fn get_table_props(
        &self,
        _creator: &str,
        _params: &ConnectionParams,
        _database: &str,
        _table: &str,
    ) -> anyhow::Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }

    async fn get_partitions(
        &self,
        _creator: &str,
        _params: &ConnectionParams,
        _database: &str,
        _table: &str,
    ) -> anyhow::Result<Value> {
        Ok(Value::Null)
    }

    async fn get_columns(
        &self,
        _creator: &str,
        _params: &ConnectionParams,
        _database: &str,
        _table: &str,
    ) -> anyhow::Result<Vec<MetaColumnInfo>> {
        Ok(vec![])
    }
}

/// Register `type_id` with a factory that sleeps for `delay` and counts builds
fn register_counting(
    registry: &ConnectorRegistry,
    type_id: &str,
    delay: Duration,
) -> Arc<AtomicUsize> {
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = builds.clone();
    let id = type_id.to_string();
    registry
        .register(type_id, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            // Blocking on purpose: widens the race window for concurrent first use
            std::thread::sleep(delay);
            Ok(Arc::new(StaticConnector { type_id: id.clone() }) as Arc<dyn MetadataConnector>)
        })
        .unwrap();
    builds
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_first_use_builds_once() {
    let registry = Arc::new(ConnectorRegistry::new());
    let builds = register_counting(&registry, "mysql", Duration::from_millis(50));

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.resolve("mysql").await })
        })
        .collect();

    let mut connectors = Vec::new();
    for handle in handles {
        connectors.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(registry.loaded_count(), 1);

    let first = &connectors[0];
    assert!(connectors.iter().all(|c| Arc::ptr_eq(c, first)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slow_type_does_not_block_other_types() {
    let registry = Arc::new(ConnectorRegistry::new());
    register_counting(&registry, "hive", Duration::from_millis(600));
    register_counting(&registry, "mysql", Duration::ZERO);

    let slow = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.resolve("hive").await })
    };
    // Let the slow construction start
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    let mysql = registry.resolve("mysql").await.unwrap();
    assert_eq!(mysql.type_id(), "mysql");
    assert!(
        started.elapsed() < Duration::from_millis(400),
        "mysql waited {:?} behind hive",
        started.elapsed()
    );

    assert_eq!(slow.await.unwrap().unwrap().type_id(), "hive");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_construction_is_retried() {
    let registry = Arc::new(ConnectorRegistry::new());
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    registry
        .register("flaky", move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("driver not ready");
            }
            Ok(Arc::new(StaticConnector {
                type_id: "flaky".to_string(),
            }) as Arc<dyn MetadataConnector>)
        })
        .unwrap();

    let err = registry.resolve("flaky").await.err().unwrap();
    assert!(matches!(err, MetadataError::ConnectorNotFound { .. }));
    assert!(!registry.is_loaded("flaky"));

    let connector = registry.resolve("flaky").await.unwrap();
    assert_eq!(connector.type_id(), "flaky");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_types_under_load() {
    let registry = Arc::new(ConnectorRegistry::new());
    let types = ["mysql", "hive", "es", "kafka"];
    let counters: Vec<_> = types
        .iter()
        .map(|t| register_counting(&registry, t, Duration::from_millis(10)))
        .collect();

    let handles: Vec<_> = (0..80)
        .map(|i| {
            let registry = registry.clone();
            let type_id = types[i % types.len()];
            tokio::spawn(async move {
                let connector = registry.resolve(type_id).await?;
                connector
                    .get_databases("u1", &ConnectionParams::new())
                    .await
                    .map_err(|e| MetadataError::ConnectorExecution {
                        type_id: type_id.to_string(),
                        operation: metaroute::Operation::GetDatabases,
                        message: e.to_string(),
                    })
                    .map(|dbs| (type_id, dbs))
            })
        })
        .collect();

    for handle in handles {
        let (type_id, dbs) = handle.await.unwrap().unwrap();
        assert_eq!(dbs, vec![type_id.to_string()]);
    }

    for counter in counters {
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
    assert_eq!(registry.loaded_count(), types.len());
}

#[tokio::test(flavor = "current_thread")]
async fn test_slow_type_on_single_threaded_runtime() {
    let registry = Arc::new(ConnectorRegistry::new());
    register_counting(&registry, "hive", Duration::from_millis(600));
    register_counting(&registry, "mysql", Duration::ZERO);

    let slow = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.resolve("hive").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let started = Instant::now();
    registry.resolve("mysql").await.unwrap();
    assert!(
        started.elapsed() < Duration::from_millis(300),
        "mysql waited {:?} behind hive",
        started.elapsed()
    );

    assert_eq!(slow.await.unwrap().unwrap().type_id(), "hive");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_construction_panic_reaches_every_waiter_as_error() {
    let registry = Arc::new(ConnectorRegistry::new());
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    registry
        .register("bad", move || -> anyhow::Result<Arc<dyn MetadataConnector>> {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            panic!("plugin init crashed")
        })
        .unwrap();
    register_counting(&registry, "mysql", Duration::ZERO);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.resolve("bad").await })
        })
        .collect();

    for handle in handles {
        // The task itself must not panic
        let outcome = handle.await.unwrap();
        assert!(matches!(outcome, Err(MetadataError::ConnectorNotFound { .. })));
    }
    assert!(attempts.load(Ordering::SeqCst) >= 1);
    assert!(!registry.is_loaded("bad"));

    // Other types are unaffected
    assert_eq!(registry.resolve("mysql").await.unwrap().type_id(), "mysql");
}
