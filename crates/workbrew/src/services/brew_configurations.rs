//! Configuration values pushed to devices

use std::sync::Arc;

use bytes::Bytes;
use workbrew_http::{ApiResponse, HttpTransport, QueryBuilder, RequestContext, Result};

use super::{fetch_csv, fetch_json};
use crate::models::BrewConfiguration;

/// `/brew_configurations` endpoints
#[derive(Clone)]
pub struct BrewConfigurationsService {
    transport: Arc<dyn HttpTransport>,
}

impl BrewConfigurationsService {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<ApiResponse<Vec<BrewConfiguration>>> {
        fetch_json(self.transport.as_ref(), ctx, "/brew_configurations.json", QueryBuilder::new()).await
    }

    /// CSV export of the same listing
    pub async fn list_csv(&self, ctx: &RequestContext) -> Result<ApiResponse<Bytes>> {
        fetch_csv(self.transport.as_ref(), ctx, "/brew_configurations.csv", QueryBuilder::new()).await
    }
}
