//! History of vulnerabilities appearing and resolving

use std::sync::Arc;

use bytes::Bytes;
use workbrew_http::{ApiResponse, HttpTransport, QueryBuilder, RequestContext, Result};

use super::{fetch_csv, fetch_json};
use crate::models::VulnerabilityChange;

/// `/vulnerability_changes` endpoints
#[derive(Clone)]
pub struct VulnerabilityChangesService {
    transport: Arc<dyn HttpTransport>,
}

impl VulnerabilityChangesService {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<ApiResponse<Vec<VulnerabilityChange>>> {
        fetch_json(self.transport.as_ref(), ctx, "/vulnerability_changes.json", QueryBuilder::new()).await
    }

    /// CSV export of the same listing
    pub async fn list_csv(&self, ctx: &RequestContext) -> Result<ApiResponse<Bytes>> {
        fetch_csv(self.transport.as_ref(), ctx, "/vulnerability_changes.csv", QueryBuilder::new()).await
    }
}
