//! BigQuery collaborators.
//!
//! The compiler core never talks to BigQuery directly; everything it needs is
//! behind [`BigQueryOps`], so the core stays client-agnostic and tests can
//! substitute a mock.

mod client;
mod errors;
mod materializer;

pub use client::BigQueryRestClient;
pub use errors::BigQueryError;
pub use materializer::{DdlOutcome, ViewMaterializer};

use async_trait::async_trait;

use crate::schema::{DatasetRef, Field, TableRef};

/// The BigQuery capabilities the pipeline depends on.
#[async_trait]
pub trait BigQueryOps: Send + Sync {
    /// Fetch the ordered field tree of a table's schema.
    async fn fetch_schema(&self, table: &TableRef) -> Result<Vec<Field>, BigQueryError>;

    /// Create a view, replacing its body if a view of that name already
    /// exists.
    async fn create_view(
        &self,
        dataset: &DatasetRef,
        view_name: &str,
        sql: &str,
    ) -> Result<(), BigQueryError>;

    /// Delete a view; a view that is already absent counts as success.
    async fn delete_view(&self, dataset: &DatasetRef, view_name: &str)
        -> Result<(), BigQueryError>;

    /// List the ids of every table and view in a dataset.
    async fn list_tables(&self, dataset: &DatasetRef) -> Result<Vec<String>, BigQueryError>;
}
