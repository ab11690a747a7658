//! View materialization: issue the create/delete DDL for compiled views.
//!
//! DDL calls run sequentially, so writes against the same view name never
//! race. A failed call is logged and recorded per view; the rest of the batch
//! still processes.

use crate::schema::DatasetRef;
use crate::view_generator::{CompiledView, VIEW_PREFIX};

use super::errors::BigQueryError;
use super::BigQueryOps;

/// Outcome of one DDL call.
#[derive(Debug)]
pub struct DdlOutcome {
    pub view_name: String,
    pub result: Result<(), BigQueryError>,
}

pub struct ViewMaterializer<'a, C: BigQueryOps> {
    client: &'a C,
}

impl<'a, C: BigQueryOps> ViewMaterializer<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Create one view per compiled statement.
    pub async fn materialize(
        &self,
        dataset: &DatasetRef,
        views: &[CompiledView],
    ) -> Vec<DdlOutcome> {
        let mut outcomes = Vec::with_capacity(views.len());
        for view in views {
            let result = self
                .client
                .create_view(dataset, &view.view_name, &view.sql)
                .await;
            match &result {
                Ok(()) => log::info!("Created view {}.{}", dataset, view.view_name),
                Err(e) => log::error!("Failed to create view {}.{}: {}", dataset, view.view_name, e),
            }
            outcomes.push(DdlOutcome {
                view_name: view.view_name.clone(),
                result,
            });
        }
        outcomes
    }

    /// Delete every generated (marker-prefixed) view in the dataset. A failed
    /// listing aborts; failed deletes do not, and already-absent views count
    /// as deleted.
    pub async fn cleanup(&self, dataset: &DatasetRef) -> Result<Vec<DdlOutcome>, BigQueryError> {
        let tables = self.client.list_tables(dataset).await?;
        let mut outcomes = Vec::new();
        for view_name in tables.into_iter().filter(|t| t.starts_with(VIEW_PREFIX)) {
            let result = self.client.delete_view(dataset, &view_name).await;
            match &result {
                Ok(()) => log::info!("Deleted view {}.{}", dataset, view_name),
                Err(e) => log::error!("Failed to delete view {}.{}: {}", dataset, view_name, e),
            }
            outcomes.push(DdlOutcome { view_name, result });
        }
        Ok(outcomes)
    }
}
