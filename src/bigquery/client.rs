//! BigQuery v2 REST client.
//!
//! Thin glue over the `tables` resource: get (schema fetch), insert/update
//! (view create/replace), delete, and list. Transient failures (HTTP 429/5xx
//! and transport errors) are retried with bounded exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::config::Settings;
use crate::schema::{DatasetRef, Field, TableRef};

use super::errors::BigQueryError;
use super::BigQueryOps;

pub struct BigQueryRestClient {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
    max_retries: u32,
    backoff_ms: u64,
}

#[derive(Deserialize)]
struct TableResource {
    schema: Option<SchemaRepr>,
}

#[derive(Deserialize)]
struct SchemaRepr {
    #[serde(default)]
    fields: Vec<Field>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableList {
    #[serde(default)]
    tables: Vec<TableListEntry>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableListEntry {
    table_reference: TableReferenceRepr,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableReferenceRepr {
    table_id: String,
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

async fn error_message(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable response body>".to_string())
}

impl BigQueryRestClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            access_token: settings.access_token.clone(),
            max_retries: settings.max_retries,
            backoff_ms: settings.backoff_ms,
        }
    }

    fn dataset_url(&self, dataset: &DatasetRef) -> String {
        format!(
            "{}/projects/{}/datasets/{}",
            self.api_base, dataset.project, dataset.dataset
        )
    }

    fn table_url(&self, dataset: &DatasetRef, table_id: &str) -> String {
        format!("{}/tables/{}", self.dataset_url(dataset), table_id)
    }

    fn view_body(dataset: &DatasetRef, view_name: &str, sql: &str) -> serde_json::Value {
        json!({
            "tableReference": {
                "projectId": dataset.project,
                "datasetId": dataset.dataset,
                "tableId": view_name,
            },
            "view": {
                "query": sql,
                "useLegacySql": false,
            }
        })
    }

    /// Send a request, retrying transient failures with exponential backoff
    /// capped by `max_retries`. Non-transient statuses are returned to the
    /// caller, which knows the per-operation semantics (404, 409, ...).
    async fn send_with_retry(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        context: &str,
    ) -> Result<reqwest::Response, BigQueryError> {
        let mut attempt: u32 = 0;
        loop {
            let mut request = self
                .http
                .request(method.clone(), url)
                .bearer_auth(&self.access_token);
            if let Some(body) = body {
                request = request.json(body);
            }
            let failure = match request.send().await {
                Ok(response) if is_transient(response.status()) => {
                    format!("status {}", response.status())
                }
                Ok(response) => return Ok(response),
                Err(e) if attempt >= self.max_retries => return Err(BigQueryError::Transport(e)),
                Err(e) => e.to_string(),
            };
            if attempt >= self.max_retries {
                return Err(BigQueryError::RetriesExhausted {
                    attempts: attempt + 1,
                    context: context.to_string(),
                    message: failure,
                });
            }
            let delay = self.backoff_ms << attempt.min(6);
            log::warn!("{} failed ({}), retrying in {}ms", context, failure, delay);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl BigQueryOps for BigQueryRestClient {
    async fn fetch_schema(&self, table: &TableRef) -> Result<Vec<Field>, BigQueryError> {
        let url = self.table_url(&table.dataset_ref(), &table.table);
        let context = format!("fetch schema for {}", table);
        let response = self.send_with_retry(Method::GET, &url, None, &context).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BigQueryError::Api {
                status: status.as_u16(),
                context,
                message: error_message(response).await,
            });
        }
        let body = response.text().await?;
        let resource: TableResource = serde_json::from_str(&body)
            .map_err(|source| BigQueryError::Decode {
                context: context.clone(),
                source,
            })?;
        resource
            .schema
            .map(|schema| schema.fields)
            .ok_or_else(|| BigQueryError::MissingSchema(table.to_string()))
    }

    async fn create_view(
        &self,
        dataset: &DatasetRef,
        view_name: &str,
        sql: &str,
    ) -> Result<(), BigQueryError> {
        let body = Self::view_body(dataset, view_name, sql);
        let url = format!("{}/tables", self.dataset_url(dataset));
        let context = format!("create view {}.{}", dataset, view_name);
        let response = self
            .send_with_retry(Method::POST, &url, Some(&body), &context)
            .await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => {
                // Replace-if-exists: update the existing view body in place.
                log::debug!("View {}.{} already exists, replacing", dataset, view_name);
                let url = self.table_url(dataset, view_name);
                let context = format!("replace view {}.{}", dataset, view_name);
                let response = self
                    .send_with_retry(Method::PUT, &url, Some(&body), &context)
                    .await?;
                let status = response.status();
                if status.is_success() {
                    Ok(())
                } else {
                    Err(BigQueryError::Api {
                        status: status.as_u16(),
                        context,
                        message: error_message(response).await,
                    })
                }
            }
            status => Err(BigQueryError::Api {
                status: status.as_u16(),
                context,
                message: error_message(response).await,
            }),
        }
    }

    async fn delete_view(
        &self,
        dataset: &DatasetRef,
        view_name: &str,
    ) -> Result<(), BigQueryError> {
        let url = self.table_url(dataset, view_name);
        let context = format!("delete view {}.{}", dataset, view_name);
        let response = self
            .send_with_retry(Method::DELETE, &url, None, &context)
            .await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                log::debug!("View {}.{} already absent", dataset, view_name);
                Ok(())
            }
            status => Err(BigQueryError::Api {
                status: status.as_u16(),
                context,
                message: error_message(response).await,
            }),
        }
    }

    async fn list_tables(&self, dataset: &DatasetRef) -> Result<Vec<String>, BigQueryError> {
        let base_url = format!("{}/tables", self.dataset_url(dataset));
        let context = format!("list tables in {}", dataset);
        let mut table_ids = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = match &page_token {
                Some(token) => format!("{}?maxResults=1000&pageToken={}", base_url, token),
                None => format!("{}?maxResults=1000", base_url),
            };
            let response = self.send_with_retry(Method::GET, &url, None, &context).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(BigQueryError::Api {
                    status: status.as_u16(),
                    context,
                    message: error_message(response).await,
                });
            }
            let body = response.text().await?;
            let page: TableList = serde_json::from_str(&body)
                .map_err(|source| BigQueryError::Decode {
                    context: context.clone(),
                    source,
                })?;
            table_ids.extend(page.tables.into_iter().map(|t| t.table_reference.table_id));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(table_ids)
    }
}
