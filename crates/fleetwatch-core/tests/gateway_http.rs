//! HTTP boundary tests against a gateway bound to an ephemeral port.

use fleetwatch_core::{
    EngineConfig, FleetEngine,
    api::{self, AppState},
};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::net::TcpListener;

async fn spawn_gateway(seed: u64) -> String {
    let engine = FleetEngine::new(EngineConfig::seeded(seed)).unwrap();
    let app = api::router(AppState::new(engine));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_machines_endpoint_ticks_fleet() {
    let base = spawn_gateway(1).await;
    let client = Client::new();

    let first: Value = client
        .get(format!("{}/api/machines", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let machines = first.as_object().unwrap();
    assert_eq!(machines.len(), 3);

    let critical = &first["Machine_3"];
    assert_eq!(critical["status"], "Critical");
    assert_eq!(critical["mode"], "hydraulic");
    assert!(critical["anomaly"].is_boolean());
    assert!(critical["predicted_rul"].as_f64().unwrap() >= 0.0);
    assert_eq!(critical["history"]["health"].as_array().unwrap().len(), 2);

    let second: Value = client
        .get(format!("{}/api/machines", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["Machine_3"]["history"]["rul"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_report_endpoint() {
    let base = spawn_gateway(2).await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/report?machine=Machine_2", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = response.text().await.unwrap();
    assert!(text.contains("Machine_2"));
    assert!(text.contains("Status:          Warning"));

    let response = client
        .get(format!("{}/api/report?machine=Machine_99", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Machine_99"));
}

#[tokio::test]
async fn test_fault_and_reset_endpoints() {
    let base = spawn_gateway(3).await;
    let client = Client::new();

    for _ in 0..3 {
        client
            .get(format!("{}/api/machines", base))
            .send()
            .await
            .unwrap();
    }

    let response = client
        .post(format!("{}/api/machines/Machine_1/fault", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = client
        .post(format!("{}/api/machines/Machine_7/fault", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{}/api/reset", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let after: Value = client
        .get(format!("{}/api/machines", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after["Machine_1"]["history"]["health"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let base = spawn_gateway(4).await;
    let client = Client::new();

    let health = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(health, "OK");

    client
        .get(format!("{}/api/machines", base))
        .send()
        .await
        .unwrap();

    let metrics = client
        .get(format!("{}/metrics", base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains("fleetwatch_ticks_total"));
    assert!(metrics.contains("fleetwatch_fleet_size"));
}
