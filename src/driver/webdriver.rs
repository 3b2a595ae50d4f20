//! W3C WebDriver client
//!
//! Talks JSON over HTTP to a running chromedriver or geckodriver. Only the
//! endpoints the [`Driver`] trait needs are implemented:
//! - `POST /session` and `DELETE /session/{id}`
//! - `POST /session/{id}/url`
//! - `GET /session/{id}/source`
//! - `POST /session/{id}/element`
//! - `POST /session/{id}/element/{eid}/click`
//! - `GET /session/{id}/element/{eid}/attribute/{name}`

use super::{Driver, DriverError, DriverResult, ElementHandle, Locator, SelectorKind};
use crate::config::DriverConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;

/// Key under which W3C drivers return element references
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// A live WebDriver session
#[derive(Debug)]
pub struct WebDriverClient {
    http: Client,
    base_url: String,
    session_id: Option<String>,
}

/// Builds the `POST /session` payload
///
/// When `download_dir` is given, Chrome is told to save downloads there
/// without prompting.
pub fn session_capabilities(config: &DriverConfig, download_dir: Option<&Path>) -> Value {
    let mut always_match = json!({ "browserName": config.browser });

    if config.browser.eq_ignore_ascii_case("firefox") {
        let args: Vec<&str> = if config.headless { vec!["-headless"] } else { vec![] };
        always_match["moz:firefoxOptions"] = json!({ "args": args });
    } else {
        let args: Vec<&str> = if config.headless {
            vec!["--headless=new"]
        } else {
            vec![]
        };
        let mut chrome_options = json!({ "args": args });
        if let Some(dir) = download_dir {
            chrome_options["prefs"] = json!({
                "download.default_directory": dir.display().to_string(),
                "download.prompt_for_download": false,
                "download.directory_upgrade": true,
                "safebrowsing.enabled": true,
            });
        }
        always_match["goog:chromeOptions"] = chrome_options;
    }

    json!({ "capabilities": { "alwaysMatch": always_match } })
}

impl WebDriverClient {
    /// Opens a new browser session on the configured WebDriver endpoint
    ///
    /// # Arguments
    ///
    /// * `config` - WebDriver endpoint and browser options
    /// * `download_dir` - Absolute directory for browser downloads, if any
    ///
    /// # Returns
    ///
    /// * `Ok(WebDriverClient)` - Session created
    /// * `Err(DriverError)` - The endpoint is unreachable or refused the session
    pub async fn connect(config: &DriverConfig, download_dir: Option<&Path>) -> DriverResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let base_url = config.webdriver_url.trim_end_matches('/').to_string();
        let payload = session_capabilities(config, download_dir);

        let value = send(http.post(format!("{}/session", base_url)).json(&payload)).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::Protocol("session response lacks sessionId".to_string()))?
            .to_string();

        tracing::info!("Opened WebDriver session {} on {}", session_id, base_url);

        Ok(Self {
            http,
            base_url,
            session_id: Some(session_id),
        })
    }

    /// Returns the id of the open session, if any
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    fn session_url(&self, tail: &str) -> DriverResult<String> {
        let id = self
            .session_id
            .as_deref()
            .ok_or_else(|| DriverError::Unavailable("session already released".to_string()))?;
        Ok(format!("{}/session/{}{}", self.base_url, id, tail))
    }
}

/// Sends a request and unwraps the W3C `{"value": ...}` envelope
async fn send(request: RequestBuilder) -> DriverResult<Value> {
    let response = request.send().await?;
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| DriverError::Protocol(format!("invalid JSON body: {}", e)))?;

    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }

    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Err(classify_error(code, message))
}

/// Maps a W3C error code onto the driver error taxonomy
fn classify_error(code: &str, message: &str) -> DriverError {
    let detail = if message.is_empty() {
        code.to_string()
    } else {
        format!("{}: {}", code, message)
    };

    match code {
        "no such element" => DriverError::NotFound(detail),
        "invalid session id" | "session not created" | "no such window" => {
            DriverError::Unavailable(detail)
        }
        _ => DriverError::Interaction(detail),
    }
}

/// Translates a locator into a W3C location strategy
fn locator_payload(locator: &Locator) -> Value {
    match locator.kind {
        SelectorKind::Css => json!({ "using": "css selector", "value": locator.selector }),
        SelectorKind::XPath => json!({ "using": "xpath", "value": locator.selector }),
        SelectorKind::Id => json!({
            "using": "css selector",
            "value": format!("[id=\"{}\"]", locator.selector),
        }),
    }
}

#[async_trait]
impl Driver for WebDriverClient {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        let endpoint = self.session_url("/url")?;
        send(self.http.post(endpoint).json(&json!({ "url": url }))).await?;
        tracing::debug!("Navigated to {}", url);
        Ok(())
    }

    async fn fetch_rendered_content(&mut self) -> DriverResult<Vec<u8>> {
        let endpoint = self.session_url("/source")?;
        match send(self.http.get(endpoint)).await? {
            Value::String(source) => Ok(source.into_bytes()),
            other => Err(DriverError::Protocol(format!(
                "page source is not a string: {}",
                other
            ))),
        }
    }

    async fn find_element(&mut self, locator: &Locator) -> DriverResult<Option<ElementHandle>> {
        let endpoint = self.session_url("/element")?;
        let value = match send(self.http.post(endpoint).json(&locator_payload(locator))).await {
            Ok(value) => value,
            Err(DriverError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| Some(ElementHandle::new(id)))
            .ok_or_else(|| DriverError::Protocol(format!("element reference missing: {}", value)))
    }

    async fn click(&mut self, element: &ElementHandle) -> DriverResult<()> {
        let endpoint = self.session_url(&format!("/element/{}/click", element.id()))?;
        send(self.http.post(endpoint).json(&json!({}))).await?;
        Ok(())
    }

    async fn attribute_of(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        let endpoint =
            self.session_url(&format!("/element/{}/attribute/{}", element.id(), name))?;
        match send(self.http.get(endpoint)).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Ok(Some(other.to_string())),
        }
    }

    async fn release(&mut self) -> DriverResult<()> {
        let Some(id) = self.session_id.take() else {
            return Ok(());
        };
        send(self.http.delete(format!("{}/session/{}", self.base_url, id))).await?;
        tracing::info!("Closed WebDriver session {}", id);
        Ok(())
    }
}

impl Drop for WebDriverClient {
    fn drop(&mut self) {
        if let Some(id) = &self.session_id {
            tracing::warn!("WebDriver session {} dropped without release", id);
        }
    }
}
