//! WebDriver client tests against a mocked chromedriver

use crate::fake_driver::listing_page;
use bourse_harvest::config::{DriverConfig, ExtractorConfig};
use bourse_harvest::crawler::{
    CrawlSession, PaginationController, PaginationSettings, RecordExtractor,
};
use bourse_harvest::driver::{Driver, DriverError, ElementHandle, Locator, WebDriverClient};
use bourse_harvest::output::CsvSink;
use bourse_harvest::state::{EndCause, Termination};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION: &str = "f00dcafe";
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

fn driver_config(server: &MockServer) -> DriverConfig {
    DriverConfig {
        webdriver_url: server.uri(),
        browser: "chrome".to_string(),
        headless: true,
        page_load_delay_ms: 0,
    }
}

fn session_path(tail: &str) -> String {
    format!("/session/{}{}", SESSION, tail)
}

fn value(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": body }))
}

fn no_such_element() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "value": {
            "error": "no such element",
            "message": "Unable to locate element",
            "stacktrace": ""
        }
    }))
}

/// Starts a mock server that accepts one new session
async fn start_driver() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(value(json!({
            "sessionId": SESSION,
            "capabilities": { "browserName": "chrome" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

async fn mount_release(server: &MockServer) {
    Mock::given(method("DELETE"))
        .and(path(session_path("")))
        .respond_with(value(json!(null)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_connect_reads_session_id() {
    let server = start_driver().await;
    mount_release(&server).await;

    let mut client = WebDriverClient::connect(&driver_config(&server), None)
        .await
        .expect("Failed to connect");
    assert_eq!(client.session_id(), Some(SESSION));

    client.release().await.expect("Failed to release");
    assert_eq!(client.session_id(), None);

    // a second release does not hit the endpoint again
    client.release().await.expect("Second release should be a no-op");
}

#[tokio::test]
async fn test_connect_refused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "value": { "error": "session not created", "message": "Chrome failed to start" }
        })))
        .mount(&server)
        .await;

    let result = WebDriverClient::connect(&driver_config(&server), None).await;

    match result {
        Err(e @ DriverError::Unavailable(_)) => assert!(e.is_fatal()),
        other => panic!("expected unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_navigate_and_fetch_source() {
    let server = start_driver().await;
    mount_release(&server).await;
    Mock::given(method("POST"))
        .and(path(session_path("/url")))
        .and(body_json(json!({ "url": "https://example.com/listing" })))
        .respond_with(value(json!(null)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(session_path("/source")))
        .respond_with(value(json!("<html><body>ok</body></html>")))
        .mount(&server)
        .await;

    let mut client = WebDriverClient::connect(&driver_config(&server), None)
        .await
        .unwrap();
    client.navigate("https://example.com/listing").await.unwrap();
    let content = client.fetch_rendered_content().await.unwrap();
    client.release().await.unwrap();

    assert_eq!(content, b"<html><body>ok</body></html>".to_vec());
}

#[tokio::test]
async fn test_find_click_and_read_attribute() {
    let server = start_driver().await;
    mount_release(&server).await;
    Mock::given(method("POST"))
        .and(path(session_path("/element")))
        .and(body_json(json!({ "using": "xpath", "value": "//div[@class='next']" })))
        .respond_with(value(json!({ ELEMENT_KEY: "el-7" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(session_path("/element/el-7/attribute/class")))
        .respond_with(value(json!("page-link inactive")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(session_path("/element/el-7/attribute/href")))
        .respond_with(value(json!(null)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(session_path("/element/el-7/click")))
        .respond_with(value(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = WebDriverClient::connect(&driver_config(&server), None)
        .await
        .unwrap();
    let element = client
        .find_element(&Locator::xpath("//div[@class='next']"))
        .await
        .unwrap()
        .expect("element should be found");
    assert_eq!(element.id(), "el-7");

    let class = client.attribute_of(&element, "class").await.unwrap();
    assert_eq!(class.as_deref(), Some("page-link inactive"));
    let href = client.attribute_of(&element, "href").await.unwrap();
    assert_eq!(href, None);

    client.click(&element).await.unwrap();
    client.release().await.unwrap();
}

#[tokio::test]
async fn test_missing_element_is_none() {
    let server = start_driver().await;
    mount_release(&server).await;
    Mock::given(method("POST"))
        .and(path(session_path("/element")))
        .respond_with(no_such_element())
        .mount(&server)
        .await;

    let mut client = WebDriverClient::connect(&driver_config(&server), None)
        .await
        .unwrap();
    let found = client.find_element(&Locator::css("div.next")).await.unwrap();
    client.release().await.unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn test_click_intercepted_is_not_fatal() {
    let server = start_driver().await;
    mount_release(&server).await;
    Mock::given(method("POST"))
        .and(path(session_path("/element/el-1/click")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "value": {
                "error": "element click intercepted",
                "message": "Other element would receive the click"
            }
        })))
        .mount(&server)
        .await;

    let mut client = WebDriverClient::connect(&driver_config(&server), None)
        .await
        .unwrap();
    let err = client
        .click(&ElementHandle::new("el-1"))
        .await
        .unwrap_err();
    client.release().await.unwrap();

    assert!(matches!(err, DriverError::Interaction(_)));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_single_page_listing_over_webdriver() {
    let server = start_driver().await;
    mount_release(&server).await;
    Mock::given(method("POST"))
        .and(path(session_path("/url")))
        .respond_with(value(json!(null)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(session_path("/source")))
        .respond_with(value(json!(listing_page(&[
            ("Acme Corp", "2.50", "01-Jan-2024"),
            ("Beta Ltd", "1.00", "02-Jan-2024"),
        ]))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(session_path("/element")))
        .respond_with(no_such_element())
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("dividends.csv");
    let mut sink = CsvSink::new(&output);

    let settings = PaginationSettings {
        next_control: Locator::css("div.next"),
        disabled_marker: "inactive".to_string(),
        settle_delay: Duration::ZERO,
        max_pages: None,
    };
    let controller = PaginationController::new(
        settings,
        RecordExtractor::new(&ExtractorConfig::default()).unwrap(),
    );

    let client = WebDriverClient::connect(&driver_config(&server), None)
        .await
        .unwrap();
    let report = CrawlSession::new(client)
        .run_listing("https://example.com/listing", controller, &mut sink)
        .await
        .expect("Listing failed");

    assert_eq!(report.dataset.len(), 2);
    assert_eq!(
        report.outcome.termination,
        Termination::NormalEnd(EndCause::ControlAbsent)
    );
    let csv = std::fs::read_to_string(&output).unwrap();
    assert!(csv.contains("Beta Ltd,1.00,02-Jan-2024"));
}
