//! Tests for the probe surface and static asset routes.

use gita_service::config::{GitaConfig, GoogleConfig, HttpConfig, ServerConfig};
use gita_service::services::providers::mock::{MockBehavior, MockTextProvider};
use gita_service::services::providers::TextProvider;
use gita_service::startup::Application;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

fn test_config() -> GitaConfig {
    GitaConfig {
        http: HttpConfig { port: 0 },
        google: GoogleConfig {
            api_key: None,
            timeout_secs: 5,
        },
        server: ServerConfig {
            static_dir: "static".to_string(),
        },
    }
}

async fn spawn_app(provider: Option<Arc<dyn TextProvider>>) -> u16 {
    let app = Application::with_provider(test_config(), provider)
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    port
}

async fn get(client: &Client, port: u16, path: &str) -> reqwest::Response {
    client
        .get(format!("http://localhost:{}{}", port, path))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
async fn health_check_returns_ok() {
    let port = spawn_app(None).await;
    let client = Client::new();

    let response = get(&client, port, "/health").await;

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "gita-service");
}

#[tokio::test]
async fn api_test_works_without_a_provider() {
    let port = spawn_app(None).await;
    let client = Client::new();

    let response = get(&client, port, "/api/test").await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "API is working!");
}

#[tokio::test]
async fn api_test_works_with_a_failing_provider() {
    let provider = MockTextProvider::new(MockBehavior::Fail("down".to_string()));
    let port = spawn_app(Some(Arc::new(provider))).await;
    let client = Client::new();

    let response = get(&client, port, "/api/test").await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "API is working!");
}

#[tokio::test]
async fn index_page_is_served() {
    let port = spawn_app(None).await;
    let client = Client::new();

    let response = get(&client, port, "/").await;

    assert_eq!(response.status(), 200);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("Ask Lord Krishna"));
}

#[tokio::test]
async fn stylesheet_and_script_are_served() {
    let port = spawn_app(None).await;
    let client = Client::new();

    for path in ["/styles.css", "/script.js"] {
        let response = get(&client, port, path).await;
        assert_eq!(response.status(), 200, "{} not served", path);
    }
}

#[tokio::test]
async fn metrics_endpoint_responds() {
    let port = spawn_app(None).await;
    let client = Client::new();

    let response = get(&client, port, "/metrics").await;

    assert_eq!(response.status(), 200);
}
