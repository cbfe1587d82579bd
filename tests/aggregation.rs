//! End-to-end aggregation tests against in-process mock stores.

use std::time::{Duration, Instant};

use edge_gateway::config::{GatewayConfig, StoreKind};

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_all_dependencies_succeed() {
    let kv_addr = common::start_mock_store().await;
    let db_addr = common::start_mock_store().await;
    let bucket_addr = common::start_mock_store().await;

    let mut config = GatewayConfig::default();
    config.greeting = "Hello!".to_string();
    config.dependencies = vec![
        common::dependency("kv", StoreKind::KeyValue, kv_addr, 500),
        common::dependency("db", StoreKind::Relational, db_addr, 500),
        common::dependency("bucket", StoreKind::Object, bucket_addr, 500),
    ];

    let (addr, shutdown) = common::start_gateway(config).await;

    let res = client()
        .get(format!("http://{}/aggregate", addr))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/json"
    );

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["kv"]["status"], "success");
    assert_eq!(body["kv"]["value"], "Hello!");
    assert_eq!(body["db"]["status"], "success");
    assert_eq!(body["db"]["value"]["rows"], 1);
    assert_eq!(body["bucket"]["status"], "success");
    assert_eq!(body["bucket"]["value"], "Hello!");

    shutdown.trigger();
}

#[tokio::test]
async fn test_one_failure_does_not_abort_siblings() {
    let kv_addr = common::start_mock_store().await;
    let db_addr = common::start_failing_store(503).await;
    let bucket_addr = common::start_mock_store().await;

    let mut config = GatewayConfig::default();
    config.dependencies = vec![
        common::dependency("kv", StoreKind::KeyValue, kv_addr, 500),
        common::dependency("db", StoreKind::Relational, db_addr, 500),
        common::dependency("bucket", StoreKind::Object, bucket_addr, 500),
    ];

    let (addr, shutdown) = common::start_gateway(config).await;

    let body: serde_json::Value = client()
        .get(format!("http://{}/aggregate", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["ok"], false);
    assert_eq!(body["kv"]["status"], "success");
    assert_eq!(body["db"]["status"], "failure");
    assert_eq!(body["db"]["kind"], "unavailable");
    assert_eq!(body["bucket"]["status"], "success");

    shutdown.trigger();
}

#[tokio::test]
async fn test_hung_dependency_times_out_at_its_deadline() {
    let kv_addr = common::start_mock_store().await;
    let bucket_addr = common::start_hanging_store().await;

    let mut config = GatewayConfig::default();
    config.dependencies = vec![
        common::dependency("kv", StoreKind::KeyValue, kv_addr, 500),
        common::dependency("bucket", StoreKind::Object, bucket_addr, 200),
    ];

    let (addr, shutdown) = common::start_gateway(config).await;

    let started = Instant::now();
    let body: serde_json::Value = client()
        .get(format!("http://{}/aggregate", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let elapsed = started.elapsed();

    // The hung branch settles at its 200ms deadline; the whole response
    // must not take meaningfully longer than max(deadlines).
    assert!(elapsed >= Duration::from_millis(200), "took {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1500), "took {:?}", elapsed);

    assert_eq!(body["ok"], false);
    assert_eq!(body["kv"]["status"], "success");
    assert_eq!(body["bucket"]["status"], "failure");
    assert_eq!(body["bucket"]["kind"], "timeout");
    assert_eq!(body["bucket"]["detail"], "deadline exceeded");

    shutdown.trigger();
}

#[tokio::test]
async fn test_disabled_dependency_reports_skipped() {
    let kv_addr = common::start_mock_store().await;

    let mut config = GatewayConfig::default();
    config.dependencies = vec![
        common::dependency("kv", StoreKind::KeyValue, kv_addr, 500),
        {
            let mut dep = common::dependency(
                "bucket",
                StoreKind::Object,
                "127.0.0.1:1".parse().unwrap(),
                500,
            );
            dep.enabled = false;
            dep
        },
    ];

    let (addr, shutdown) = common::start_gateway(config).await;

    let body: serde_json::Value = client()
        .get(format!("http://{}/aggregate", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Skipped keeps its slot and does not count against overall health.
    assert_eq!(body["ok"], true);
    assert_eq!(body["bucket"]["status"], "skipped");
    assert_eq!(body["bucket"]["detail"], "disabled in configuration");

    shutdown.trigger();
}

#[tokio::test]
async fn test_healthz_reflects_failing_dependency() {
    let kv_addr = common::start_mock_store().await;
    let db_addr = common::start_failing_store(500).await;

    let mut config = GatewayConfig::default();
    config.dependencies = vec![
        common::dependency("kv", StoreKind::KeyValue, kv_addr, 500),
        common::dependency("db", StoreKind::Relational, db_addr, 500),
    ];
    config.health.unhealthy_threshold = 1;
    config.health.healthy_threshold = 1;

    let (addr, shutdown) = common::start_gateway(config).await;
    let client = client();

    let _ = client
        .get(format!("http://{}/aggregate", addr))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = client
        .get(format!("http://{}/healthz", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "degraded");
    assert_eq!(body["dependencies"]["kv"], "healthy");
    assert_eq!(body["dependencies"]["db"], "unhealthy");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_route_is_gateway_level_404() {
    let (addr, shutdown) = common::start_gateway(GatewayConfig::default()).await;

    let res = client()
        .get(format!("http://{}/nope", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}
