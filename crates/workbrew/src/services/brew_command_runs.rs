//! Runs of every brew command across the fleet

use std::sync::Arc;

use bytes::Bytes;
use workbrew_http::{ApiResponse, HttpTransport, QueryBuilder, RequestContext, Result};

use super::{fetch_csv, fetch_json};
use crate::models::BrewCommandRun;

/// `/brew_command_runs` endpoints
#[derive(Clone)]
pub struct BrewCommandRunsService {
    transport: Arc<dyn HttpTransport>,
}

impl BrewCommandRunsService {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<ApiResponse<Vec<BrewCommandRun>>> {
        fetch_json(self.transport.as_ref(), ctx, "/brew_command_runs.json", QueryBuilder::new()).await
    }

    /// CSV export of the same listing
    pub async fn list_csv(&self, ctx: &RequestContext) -> Result<ApiResponse<Bytes>> {
        fetch_csv(self.transport.as_ref(), ctx, "/brew_command_runs.csv", QueryBuilder::new()).await
    }
}
