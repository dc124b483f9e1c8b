//! REST client for the hosted categories table.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, instrument};

use imune_core::config::backend::BackendConfig;
use imune_core::error::{AppError, ErrorKind};
use imune_core::result::AppResult;
use imune_core::types::CategoryId;
use imune_entity::category::{Category, CategoryPatch, HierarchyUpdate, NewCategoryRecord};

use crate::store::CategoryStore;

/// Arguments of the hierarchy remote procedure.
#[derive(Debug, Serialize)]
struct HierarchyArgs<'a> {
    category_id: &'a CategoryId,
    new_parent_id: Option<&'a CategoryId>,
    new_position: i32,
}

/// Body of a PATCH: the caller's fields plus a fresh `updated_at`.
///
/// A blank description is sent as `null` so the column is cleared.
#[derive(Debug, Serialize)]
struct PatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
    updated_at: chrono::DateTime<Utc>,
}

impl<'a> PatchBody<'a> {
    fn new(patch: &'a CategoryPatch) -> Self {
        Self {
            name: patch.name.as_deref(),
            description: patch
                .description
                .as_deref()
                .map(|d| Some(d.trim()).filter(|d| !d.is_empty())),
            color: patch.color.as_deref(),
            is_active: patch.is_active,
            updated_at: Utc::now(),
        }
    }
}

/// Category store backed by a PostgREST endpoint (`/rest/v1`).
#[derive(Debug, Clone)]
pub struct RestCategoryStore {
    client: Client,
    /// `{url}/rest/v1/`
    base: Url,
    table: String,
    hierarchy_function: String,
}

impl RestCategoryStore {
    /// Build a client with the project API key attached to every request.
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let base = Url::parse(&format!("{}/rest/v1/", config.url.trim_end_matches('/')))
            .map_err(|e| AppError::configuration(format!("Invalid backend.url: {e}")))?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| AppError::configuration(format!("Invalid backend.api_key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| AppError::configuration(format!("Invalid backend.api_key: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(reqwest::header::AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            table: config.table.clone(),
            hierarchy_function: config.hierarchy_function.clone(),
        })
    }

    fn table_url(&self) -> AppResult<Url> {
        self.base
            .join(&self.table)
            .map_err(|e| AppError::configuration(format!("Invalid table name: {e}")))
    }

    fn list_url(&self) -> AppResult<Url> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "position.asc");
        Ok(url)
    }

    fn row_url(&self, id: &CategoryId) -> AppResult<Url> {
        let mut url = self.table_url()?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        Ok(url)
    }

    fn rpc_url(&self) -> AppResult<Url> {
        self.base
            .join(&format!("rpc/{}", self.hierarchy_function))
            .map_err(|e| AppError::configuration(format!("Invalid hierarchy function: {e}")))
    }

    /// Decode a `return=representation` body and take its single row.
    async fn single_row(response: Response, id: &str) -> AppResult<Category> {
        let rows: Vec<Category> = check_status(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(format!("Category '{id}' not found")))
    }
}

/// Map a transport or decoding failure to an application error.
fn transport_error(err: reqwest::Error) -> AppError {
    let kind = if err.is_connect() || err.is_timeout() {
        ErrorKind::ServiceUnavailable
    } else if err.is_decode() {
        ErrorKind::Serialization
    } else {
        ErrorKind::ExternalService
    };
    AppError::with_source(kind, format!("Backend request failed: {err}"), err)
}

/// Pass successful responses through; turn everything else into an error.
async fn check_status(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

/// Map a backend status code to an application error.
fn status_error(status: StatusCode, body: &str) -> AppError {
    let message = format!("Backend returned {status}: {}", body.trim());
    match status {
        StatusCode::NOT_FOUND => AppError::not_found(message),
        StatusCode::CONFLICT => AppError::conflict(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            AppError::validation(message)
        }
        StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::BAD_GATEWAY
        | StatusCode::GATEWAY_TIMEOUT => AppError::service_unavailable(message),
        _ => AppError::external_service(message),
    }
}

#[async_trait]
impl CategoryStore for RestCategoryStore {
    fn provider_type(&self) -> &str {
        "rest"
    }

    #[instrument(skip(self))]
    async fn list(&self) -> AppResult<Vec<Category>> {
        let response = self
            .client
            .get(self.list_url()?)
            .send()
            .await
            .map_err(transport_error)?;
        let rows: Vec<Category> = check_status(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        debug!(count = rows.len(), "Fetched categories");
        Ok(rows)
    }

    #[instrument(skip(self, record), fields(name = %record.name))]
    async fn create(&self, record: &NewCategoryRecord) -> AppResult<Category> {
        let response = self
            .client
            .post(self.table_url()?)
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await
            .map_err(transport_error)?;
        Self::single_row(response, &record.name).await
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &CategoryId, patch: &CategoryPatch) -> AppResult<Category> {
        let body = PatchBody::new(patch);
        let response = self
            .client
            .patch(self.row_url(id)?)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        Self::single_row(response, id.as_str()).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &CategoryId) -> AppResult<()> {
        let response = self
            .client
            .delete(self.row_url(id)?)
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(transport_error)?;
        Self::single_row(response, id.as_str()).await.map(|_| ())
    }

    #[instrument(skip(self), fields(category_id = %update.category_id))]
    async fn update_hierarchy(&self, update: &HierarchyUpdate) -> AppResult<()> {
        let args = HierarchyArgs {
            category_id: &update.category_id,
            new_parent_id: update.parent_id.as_ref(),
            new_position: update.position,
        };
        let response = self
            .client
            .post(self.rpc_url()?)
            .json(&args)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await?;
        Ok(())
    }
}
