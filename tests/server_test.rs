//! Live-socket test: real listener, real client, graceful shutdown.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tokio::net::TcpListener;

use cv_gateway::cv::CvData;
use cv_gateway::http::HttpServer;
use cv_gateway::lifecycle::Shutdown;
use cv_gateway::security::webhook::{sign, SIGNATURE_HEADER, TIMESTAMP_HEADER};

mod common;
use common::*;

#[tokio::test]
async fn serves_signed_updates_and_stops_on_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(test_config()).unwrap();
    let cv: CvData = serde_json::from_value(sample_cv()).unwrap();
    server.state().cv.replace(cv).await;

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.wait()));
    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    let health: Value = client
        .get(format!("{}/api/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let payload = skills_update().to_string();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let response = client
        .post(format!("{}/api/webhook/cv", base))
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, sign(payload.as_bytes(), SECRET).unwrap())
        .header(TIMESTAMP_HEADER, now.to_string())
        .body(payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));

    let cv: Value = client
        .get(format!("{}/api/cv", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cv["data"]["skills"][0]["category"], "Backend");

    drop(client);
    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop after shutdown");
    assert!(result.unwrap().is_ok());
}
