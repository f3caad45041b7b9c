//! Command usage analytics

use std::sync::Arc;

use bytes::Bytes;
use workbrew_http::{ApiResponse, HttpTransport, QueryBuilder, RequestContext, Result};

use super::{fetch_csv, fetch_json};
use crate::models::AnalyticsEntry;

/// `/analytics` endpoints
#[derive(Clone)]
pub struct AnalyticsService {
    transport: Arc<dyn HttpTransport>,
}

impl AnalyticsService {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<ApiResponse<Vec<AnalyticsEntry>>> {
        fetch_json(self.transport.as_ref(), ctx, "/analytics.json", QueryBuilder::new()).await
    }

    /// CSV export of the same listing
    pub async fn list_csv(&self, ctx: &RequestContext) -> Result<ApiResponse<Bytes>> {
        fetch_csv(self.transport.as_ref(), ctx, "/analytics.csv", QueryBuilder::new()).await
    }
}
