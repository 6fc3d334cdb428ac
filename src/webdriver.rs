//! Minimal W3C WebDriver client
//!
//! Covers the commands the admin-UI adapter needs: sessions, navigation,
//! element lookup, typing, clicking and script execution. Waits poll for a
//! condition instead of sleeping a fixed time.

use reqwest::{Client, Method, Url};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

/// W3C element reference key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Error, Debug)]
pub enum WebDriverError {
    #[error("webdriver transport: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{error}: {message}")]
    Command { error: String, message: String },

    #[error("timed out after {0:?} waiting for {1}")]
    Timeout(Duration, String),

    #[error("protocol violation: {0}")]
    Protocol(String),
}

impl WebDriverError {
    pub fn is_no_such_element(&self) -> bool {
        matches!(self, Self::Command { error, .. } if error == "no such element")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Locator<'a> {
    Css(&'a str),
    XPath(&'a str),
}

impl Locator<'_> {
    fn to_json(self) -> Value {
        match self {
            Locator::Css(selector) => json!({ "using": "css selector", "value": selector }),
            Locator::XPath(path) => json!({ "using": "xpath", "value": path }),
        }
    }
}

impl std::fmt::Display for Locator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Locator::Css(s) => write!(f, "css `{s}`"), Locator::XPath(s) => write!(f, "xpath `{s}`") }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementRef(String);

impl ElementRef {
    fn from_value(value: &Value) -> Result<Self, WebDriverError> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| Self(id.to_string()))
            .ok_or_else(|| WebDriverError::Protocol(format!("not an element reference: {value}")))
    }
}

/// Pull `value` out of a WebDriver response body, turning error payloads
/// into [`WebDriverError::Command`].
fn unwrap_value(success: bool, mut body: Value) -> Result<Value, WebDriverError> {
    let value = body.get_mut("value").map(Value::take).unwrap_or(Value::Null);
    if success {
        return Ok(value);
    }
    let error = value.get("error").and_then(Value::as_str).unwrap_or("unknown error").to_string();
    let message = value.get("message").and_then(Value::as_str).unwrap_or_default().to_string();
    Err(WebDriverError::Command { error, message })
}

pub struct WebDriver {
    client: Client,
    endpoint: Url,
    session_id: String,
}

impl WebDriver {
    /// Open a new browser session on the WebDriver server at `endpoint`.
    pub async fn connect(endpoint: Url, capabilities: Value) -> Result<Self, WebDriverError> {
        let client = Client::new();
        let body = json!({ "capabilities": { "alwaysMatch": capabilities } });
        let value = raw_command(&client, Method::POST, join(&endpoint, "session")?, Some(body)).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| WebDriverError::Protocol("new session response without sessionId".into()))?
            .to_string();
        debug!(%session_id, "webdriver session opened");
        Ok(Self { client, endpoint, session_id })
    }

    pub fn session_id(&self) -> &str { &self.session_id }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, WebDriverError> {
        let url = join(&self.endpoint, &format!("session/{}/{}", self.session_id, path))?;
        raw_command(&self.client, method, url, body).await
    }

    pub async fn goto(&self, url: &str) -> Result<(), WebDriverError> {
        self.command(Method::POST, "url", Some(json!({ "url": url }))).await.map(drop)
    }

    pub async fn current_url(&self) -> Result<String, WebDriverError> {
        let value = self.command(Method::GET, "url", None).await?;
        value.as_str().map(str::to_string).ok_or_else(|| WebDriverError::Protocol(format!("url is not a string: {value}")))
    }

    pub async fn find(&self, locator: Locator<'_>) -> Result<ElementRef, WebDriverError> {
        let value = self.command(Method::POST, "element", Some(locator.to_json())).await?;
        ElementRef::from_value(&value)
    }

    pub async fn find_in(&self, parent: &ElementRef, locator: Locator<'_>) -> Result<ElementRef, WebDriverError> {
        let value = self.command(Method::POST, &format!("element/{}/element", parent.0), Some(locator.to_json())).await?;
        ElementRef::from_value(&value)
    }

    /// Poll until `locator` matches an element.
    pub async fn wait_for(&self, locator: Locator<'_>, timeout: Duration) -> Result<ElementRef, WebDriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find(locator).await {
                Ok(element) => return Ok(element),
                Err(e) if e.is_no_such_element() && Instant::now() < deadline => {
                    trace!(%locator, "element not present yet");
                    sleep(POLL_INTERVAL).await;
                }
                Err(e) if e.is_no_such_element() => return Err(WebDriverError::Timeout(timeout, locator.to_string())),
                Err(e) => return Err(e),
            }
        }
    }

    /// Poll the current URL until `accept` returns true, yielding that URL.
    pub async fn wait_for_url(
        &self,
        what: &str,
        timeout: Duration,
        accept: impl Fn(&str) -> bool,
    ) -> Result<String, WebDriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            let url = self.current_url().await?;
            if accept(&url) {
                return Ok(url);
            }
            if Instant::now() >= deadline {
                return Err(WebDriverError::Timeout(timeout, what.to_string()));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn clear(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        self.command(Method::POST, &format!("element/{}/clear", element.0), Some(json!({}))).await.map(drop)
    }

    pub async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), WebDriverError> {
        self.command(Method::POST, &format!("element/{}/value", element.0), Some(json!({ "text": text }))).await.map(drop)
    }

    pub async fn click(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        self.command(Method::POST, &format!("element/{}/click", element.0), Some(json!({}))).await.map(drop)
    }

    pub async fn is_selected(&self, element: &ElementRef) -> Result<bool, WebDriverError> {
        let value = self.command(Method::GET, &format!("element/{}/selected", element.0), None).await?;
        value.as_bool().ok_or_else(|| WebDriverError::Protocol(format!("selected is not a bool: {value}")))
    }

    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, WebDriverError> {
        self.command(Method::POST, "execute/sync", Some(json!({ "script": script, "args": args }))).await
    }

    pub async fn quit(&self) -> Result<(), WebDriverError> {
        let url = join(&self.endpoint, &format!("session/{}", self.session_id))?;
        raw_command(&self.client, Method::DELETE, url, None).await.map(drop)
    }
}

fn join(endpoint: &Url, path: &str) -> Result<Url, WebDriverError> {
    let base = if endpoint.path().ends_with('/') {
        endpoint.clone()
    } else {
        let mut with_slash = endpoint.clone();
        with_slash.set_path(&format!("{}/", endpoint.path()));
        with_slash
    };
    base.join(path).map_err(|e| WebDriverError::Protocol(format!("bad command path {path}: {e}")))
}

async fn raw_command(client: &Client, method: Method, url: Url, body: Option<Value>) -> Result<Value, WebDriverError> {
    trace!(%method, %url, "webdriver command");
    let request = client.request(method, url);
    let request = match body { Some(body) => request.json(&body), None => request };
    let response = request.send().await?;
    let success = response.status().is_success();
    let body: Value = response.json().await?;
    unwrap_value(success, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_payload_becomes_command_error() {
        let body = json!({ "value": { "error": "no such element", "message": "Unable to locate element", "stacktrace": "" } });
        let err = unwrap_value(false, body).unwrap_err();
        assert!(err.is_no_such_element());
        assert_eq!(err.to_string(), "no such element: Unable to locate element");
    }

    #[test]
    fn test_success_payload() {
        assert_eq!(unwrap_value(true, json!({ "value": null })).unwrap(), Value::Null);
        assert_eq!(unwrap_value(true, json!({ "value": "http://x/" })).unwrap(), json!("http://x/"));
    }

    #[test]
    fn test_element_reference() {
        let element = ElementRef::from_value(&json!({ ELEMENT_KEY: "f.1.e.2" })).unwrap();
        assert_eq!(element, ElementRef("f.1.e.2".into()));
        assert!(ElementRef::from_value(&json!({ "ELEMENT": "legacy" })).is_err());
    }

    #[test]
    fn test_locator_strategies() {
        assert_eq!(Locator::Css("input[name=\"email\"]").to_json()["using"], "css selector");
        assert_eq!(Locator::XPath("//button").to_json()["using"], "xpath");
    }

    #[test]
    fn test_command_paths_keep_endpoint_prefix() {
        let endpoint = Url::parse("http://localhost:4444/wd/hub").unwrap();
        assert_eq!(join(&endpoint, "session").unwrap().as_str(), "http://localhost:4444/wd/hub/session");
    }
}
