//! Admin-UI adapter
//!
//! Drives the store's content-manager screens through a WebDriver server.
//! Every step waits for the page to acknowledge the previous one (an element
//! appearing, the URL changing) instead of sleeping.

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use super::{base_url_with_slash, ContentStore, Credentials, Session, SessionCredential, StoreError};
use crate::domain::components::{ColorOption, Component, SizeOption};
use crate::domain::{EntityKind, Record, RecordId};
use crate::webdriver::{ElementRef, Locator, WebDriver};

const CREATE_ENTRY: &str = "//*[self::a or self::button][contains(normalize-space(.), 'Create new entry')]";
const SAVE_BUTTON: &str = "//button[normalize-space(.)='Save']";
const PUBLISH_BUTTON: &str = "//button[normalize-space(.)='Publish']";
const PUBLISHED_BADGE: &str = "//*[normalize-space(text())='Published']";

#[derive(Clone, Debug)]
pub struct BrowserOptions {
    pub webdriver_url: String,
    pub headless: bool,
    /// Upper bound for any single acknowledgment wait.
    pub step_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self { webdriver_url: "http://localhost:9515".into(), headless: false, step_timeout: Duration::from_secs(15) }
    }
}

pub struct BrowserStore {
    driver: WebDriver,
    admin_url: Url,
    step_timeout: Duration,
    session: Option<Session>,
    manual_steps: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FieldInput {
    Text(String),
    Toggle(bool),
    Choice(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FormField {
    pub name: String,
    pub input: FieldInput,
}

/// What can be typed into the edit form, and what has to be set by hand.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FormPlan {
    pub fields: Vec<FormField>,
    pub manual: Vec<String>,
}

pub(crate) fn form_plan(record: &Record) -> Result<FormPlan, StoreError> {
    let kind = record.kind();
    let Value::Object(attributes) = serde_json::to_value(record).map_err(|e| StoreError::UnexpectedResponse(e.to_string()))? else {
        return Err(StoreError::UnexpectedResponse(format!("{kind} did not serialize to an object")));
    };
    let mut plan = FormPlan::default();
    for (name, value) in attributes {
        let input = match value {
            Value::Null => continue,
            Value::Bool(flag) => FieldInput::Toggle(flag),
            Value::Number(n) => FieldInput::Text(n.to_string()),
            Value::String(s) if kind.choice_fields().contains(&name.as_str()) => FieldInput::Choice(s),
            Value::String(s) => FieldInput::Text(s),
            Value::Array(_) | Value::Object(_) => {
                plan.manual.push(describe_manual(&name));
                continue;
            }
        };
        plan.fields.push(FormField { name, input });
    }
    Ok(plan)
}

fn describe_manual(attribute: &str) -> String {
    match attribute {
        "tamanhos" => format!("{attribute} ({} component)", SizeOption::UID),
        "cores" => format!("{attribute} ({} component)", ColorOption::UID),
        "categorias" | "produtos" => format!("{attribute} (relation)"),
        _ => format!("{attribute} (json)"),
    }
}

/// The admin panel lives under `<store>/admin/`, keeping any path prefix.
pub(crate) fn admin_url(store_url: &str) -> Result<Url, StoreError> {
    base_url_with_slash(store_url)?.join("admin/").map_err(|e| StoreError::InvalidUrl(format!("{store_url}: {e}")))
}

/// URL path without query or fragment, and without a trailing slash.
fn url_path(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url).trim_end_matches('/')
}

pub(crate) fn is_create_url(url: &str) -> bool {
    url_path(url).ends_with("/create")
}

/// Editor URLs end in the entry's document id once it has been saved.
pub(crate) fn document_id_from_url(url: &str) -> Option<&str> {
    let last = url_path(url).rsplit('/').next()?;
    (!last.is_empty() && last != "create" && !last.contains("::")).then_some(last)
}

impl BrowserStore {
    pub async fn launch(store_url: &str, options: &BrowserOptions) -> Result<Self, StoreError> {
        let admin_url = admin_url(store_url)?;
        let endpoint = Url::parse(&options.webdriver_url).map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", options.webdriver_url)))?;
        let mut args = vec!["--window-size=1440,900"];
        if options.headless {
            args.push("--headless=new");
        }
        let capabilities = json!({ "browserName": "chrome", "goog:chromeOptions": { "args": args } });
        let driver = WebDriver::connect(endpoint, capabilities).await?;
        Ok(Self { driver, admin_url, step_timeout: options.step_timeout, session: None, manual_steps: Vec::new() })
    }

    fn admin_page(&self, path: &str) -> Result<String, StoreError> {
        self.admin_url.join(path).map(String::from).map_err(|e| StoreError::InvalidUrl(e.to_string()))
    }

    fn collection_page(&self, kind: EntityKind) -> Result<String, StoreError> {
        self.admin_page(&format!("content-manager/collection-types/{}", kind.admin_uid()))
    }

    async fn field(&self, name: &str) -> Result<ElementRef, StoreError> {
        let selector = format!("[name=\"{name}\"]");
        Ok(self.driver.wait_for(Locator::Css(&selector), self.step_timeout).await?)
    }

    async fn fill(&self, field: &FormField) -> Result<(), StoreError> {
        let element = self.field(&field.name).await?;
        match &field.input {
            FieldInput::Text(text) => {
                self.driver.clear(&element).await?;
                self.driver.send_keys(&element, text).await?;
            }
            FieldInput::Toggle(wanted) => {
                if self.driver.is_selected(&element).await? != *wanted {
                    self.driver.click(&element).await?;
                }
            }
            FieldInput::Choice(option) => {
                self.driver.click(&element).await?;
                let selector = format!("option[value=\"{option}\"]");
                let choice = self.driver.find_in(&element, Locator::Css(&selector)).await?;
                self.driver.click(&choice).await?;
            }
        }
        Ok(())
    }

    async fn click(&self, xpath: &str) -> Result<(), StoreError> {
        let button = self.driver.wait_for(Locator::XPath(xpath), self.step_timeout).await?;
        Ok(self.driver.click(&button).await?)
    }

    /// The admin panel keeps its JWT in web storage; absent means cookie auth.
    async fn stored_token(&self) -> Option<String> {
        let script = "return window.localStorage.getItem('jwtToken') || window.sessionStorage.getItem('jwtToken');";
        match self.driver.execute(script, Vec::new()).await {
            Ok(Value::String(token)) => Some(token.trim_matches('"').to_string()),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "could not read admin token from storage");
                None
            }
        }
    }
}

#[async_trait]
impl ContentStore for BrowserStore {
    fn name(&self) -> &'static str { "browser" }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), StoreError> {
        self.driver.goto(self.admin_url.as_str()).await?;
        let email = self.driver.wait_for(Locator::Css("input[name=\"email\"]"), self.step_timeout).await?;
        self.driver.send_keys(&email, &credentials.email).await?;
        let password = self.driver.find(Locator::Css("input[name=\"password\"]")).await?;
        self.driver.send_keys(&password, &credentials.password).await?;
        let submit = self.driver.find(Locator::Css("button[type=\"submit\"]")).await?;
        self.driver.click(&submit).await?;

        self.driver
            .wait_for_url("admin home after login", self.step_timeout, |url| !url.contains("/auth/"))
            .await
            .map_err(|e| StoreError::Authentication(e.to_string()))?;

        let credential = match self.stored_token().await {
            Some(token) => SessionCredential::Bearer(token),
            None => SessionCredential::Browser { session_id: self.driver.session_id().to_string() },
        };
        self.session = Some(Session::new(credential));
        Ok(())
    }

    fn session(&self) -> Option<&Session> { self.session.as_ref() }

    async fn create_record(&mut self, record: &Record) -> Result<RecordId, StoreError> {
        if self.session.is_none() {
            return Err(StoreError::NotAuthenticated);
        }
        let plan = form_plan(record)?;
        self.driver.goto(&self.collection_page(record.kind())?).await?;
        self.click(CREATE_ENTRY).await?;
        self.driver
            .wait_for_url("entry editor", self.step_timeout, is_create_url)
            .await?;

        for field in &plan.fields {
            self.fill(field).await?;
        }
        if !plan.manual.is_empty() {
            warn!(label = record.label(), fields = ?plan.manual, "fields must be configured manually in the admin panel");
            self.manual_steps.extend(plan.manual.iter().map(|field| format!("{}: {field}", record.label())));
        }

        self.click(SAVE_BUTTON).await?;
        let url = self.driver
            .wait_for_url("saved entry", self.step_timeout, |url| document_id_from_url(url).is_some())
            .await?;
        document_id_from_url(&url)
            .map(|id| RecordId::Document(id.to_string()))
            .ok_or_else(|| StoreError::UnexpectedResponse(format!("no document id in {url}")))
    }

    async fn publish_record(&mut self, kind: EntityKind, id: &RecordId) -> Result<(), StoreError> {
        let editor = format!("{}/{}", self.collection_page(kind)?, id);
        if self.driver.current_url().await? != editor {
            self.driver.goto(&editor).await?;
        }
        self.click(PUBLISH_BUTTON).await?;
        self.driver.wait_for(Locator::XPath(PUBLISHED_BADGE), self.step_timeout).await?;
        Ok(())
    }

    fn take_manual_steps(&mut self) -> Vec<String> { std::mem::take(&mut self.manual_steps) }

    async fn shutdown(&mut self) -> Result<(), StoreError> {
        self.session = None;
        Ok(self.driver.quit().await?)
    }
}
