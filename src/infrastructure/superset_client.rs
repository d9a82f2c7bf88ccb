// Superset REST client implementation
use crate::application::platform_api::{DashboardPage, DatasetPage, Page, PlatformApi};
use crate::domain::chart::ChartRecord;
use crate::domain::dashboard::DashboardRecord;
use crate::domain::dataset::DatasetDescriptor;
use crate::domain::ids::{ChartId, DashboardId};
use crate::infrastructure::config::SupersetSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

const DATASET_COLUMNS: [&str; 3] = ["id", "table_name", "datasource_type"];

/// Session tokens obtained once at login
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub csrf_token: String,
}

#[derive(Debug, Clone)]
pub struct SupersetClient {
    http: reqwest::Client,
    api_root: String,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ResultEnvelope<T> {
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CreatedEnvelope {
    #[serde(default)]
    id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PageEnvelope<T> {
    count: Option<usize>,
    result: Option<Vec<T>>,
}

impl<T> From<PageEnvelope<T>> for Page<T> {
    fn from(envelope: PageEnvelope<T>) -> Self {
        Page {
            count: envelope.count,
            result: envelope.result,
        }
    }
}

impl SupersetClient {
    /// Log in and fetch the CSRF token. The cookie store keeps the session
    /// cookie the CSRF token is bound to.
    pub async fn login(settings: &SupersetSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;
        let api_root = settings.api_root();

        let response = http
            .post(format!("{}security/login", api_root))
            .json(&json!({
                "username": settings.username,
                "password": settings.password,
                "provider": settings.provider,
                "refresh": true,
            }))
            .send()
            .await
            .context("Failed to send login request")?;
        let login: LoginResponse = check_status(response, "Login")
            .await?
            .json()
            .await
            .context("Failed to parse login response")?;

        let response = http
            .get(format!("{}security/csrf_token/", api_root))
            .bearer_auth(&login.access_token)
            .send()
            .await
            .context("Failed to send CSRF token request")?;
        let csrf: ResultEnvelope<String> = check_status(response, "CSRF token")
            .await?
            .json()
            .await
            .context("Failed to parse CSRF token response")?;
        let csrf_token = csrf
            .result
            .context("CSRF token response carried no result")?;

        tracing::info!(endpoint = %settings.endpoint, user = %settings.username, "Authenticated with BI server");

        Ok(Self::with_credentials(
            http,
            api_root,
            Credentials {
                access_token: login.access_token,
                csrf_token,
            },
        ))
    }

    pub fn with_credentials(http: reqwest::Client, api_root: String, credentials: Credentials) -> Self {
        let api_root = format!("{}/", api_root.trim_end_matches('/'));
        Self {
            http,
            api_root,
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    fn query_url(&self, path: &str, query: &Value) -> String {
        let query = query.to_string();
        format!("{}{}?q={}", self.api_root, path, urlencoding::encode(&query))
    }

    fn dataset_query_url(&self, page: u32, page_size: u32) -> String {
        let query = json!({
            "columns": DATASET_COLUMNS,
            "page": page,
            "page_size": page_size,
        });
        self.query_url("dataset/", &query)
    }

    fn dashboard_query_url(&self, page: u32, page_size: u32) -> String {
        self.query_url("dashboard/", &json!({"page": page, "page_size": page_size}))
    }

    fn export_url(&self, id: DashboardId) -> String {
        format!("{}dashboard/export/?q=!({})", self.api_root, id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.credentials.access_token)
            .header("X-CSRFToken", &self.credentials.csrf_token)
    }

    async fn execute(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", what))?;
        check_status(response, what).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let request = self
            .request(Method::GET, url)
            .header("Accept", "application/json");
        self.execute(request, what)
            .await?
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }

    /// GET a single record; a 404 is `None`
    async fn get_record<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<Option<T>> {
        let response = self
            .request(Method::GET, url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", what))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: ResultEnvelope<T> = check_status(response, what)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", what))?;
        Ok(envelope.result)
    }

    /// POST a create body and read back `{"id": ...}`
    async fn create(&self, path: &str, body: &Value, what: &str) -> Result<Option<Value>> {
        let request = self.request(Method::POST, &self.url(path)).json(body);
        let created: CreatedEnvelope = self
            .execute(request, what)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", what))?;
        Ok(created.id)
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("{} request failed with status {}: {}", what, status, body);
    }
    Ok(response)
}

#[async_trait]
impl PlatformApi for SupersetClient {
    async fn fetch_dashboard_page(&self, page: u32, page_size: u32) -> Result<DashboardPage> {
        let envelope: PageEnvelope<DashboardRecord> = self
            .get_json(&self.dashboard_query_url(page, page_size), "Dashboard listing")
            .await?;
        if envelope.result.is_none() {
            tracing::warn!(page, "Dashboard listing response carried no result");
        }
        Ok(envelope.into())
    }

    async fn export_dashboard(&self, id: DashboardId) -> Result<Bytes> {
        let request = self
            .request(Method::GET, &self.export_url(id))
            .header("Accept", "application/zip");
        self.execute(request, "Dashboard export")
            .await?
            .bytes()
            .await
            .context("Failed to read dashboard export")
    }

    async fn create_dashboard(&self, body: &Value) -> Result<Option<DashboardId>> {
        let id = self.create("dashboard/", body, "Dashboard create").await?;
        Ok(id.as_ref().and_then(DashboardId::from_value))
    }

    async fn get_dashboard(&self, id: DashboardId) -> Result<Option<DashboardRecord>> {
        self.get_record(&self.url(&format!("dashboard/{}", id)), "Dashboard")
            .await
    }

    async fn update_dashboard(&self, id: DashboardId, body: &Value) -> Result<()> {
        let request = self
            .request(Method::PUT, &self.url(&format!("dashboard/{}", id)))
            .json(body);
        self.execute(request, "Dashboard update").await?;
        Ok(())
    }

    async fn fetch_dataset_page(&self, page: u32, page_size: u32) -> Result<DatasetPage> {
        let envelope: PageEnvelope<DatasetDescriptor> = self
            .get_json(&self.dataset_query_url(page, page_size), "Dataset query")
            .await?;
        Ok(envelope.into())
    }

    async fn get_chart(&self, id: ChartId) -> Result<Option<ChartRecord>> {
        self.get_record(&self.url(&format!("chart/{}", id)), "Chart")
            .await
    }

    async fn create_chart(&self, body: &Value) -> Result<Option<ChartId>> {
        let id = self.create("chart/", body, "Chart create").await?;
        Ok(id.as_ref().and_then(ChartId::from_value))
    }
}
