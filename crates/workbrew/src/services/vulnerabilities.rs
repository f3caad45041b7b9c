//! Vulnerabilities affecting installed formulae

use std::sync::Arc;

use bytes::Bytes;
use workbrew_http::{ApiResponse, HttpTransport, QueryBuilder, RequestContext, Result};

use super::{fetch_csv, fetch_json};
use crate::models::Vulnerability;

/// `/vulnerabilities` endpoints
#[derive(Clone)]
pub struct VulnerabilitiesService {
    transport: Arc<dyn HttpTransport>,
}

impl VulnerabilitiesService {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<ApiResponse<Vec<Vulnerability>>> {
        fetch_json(self.transport.as_ref(), ctx, "/vulnerabilities.json", QueryBuilder::new()).await
    }

    /// CSV export of the same listing
    pub async fn list_csv(&self, ctx: &RequestContext) -> Result<ApiResponse<Bytes>> {
        fetch_csv(self.transport.as_ref(), ctx, "/vulnerabilities.csv", QueryBuilder::new()).await
    }
}
