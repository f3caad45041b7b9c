//! Installed casks

use std::sync::Arc;

use bytes::Bytes;
use workbrew_http::{ApiResponse, HttpTransport, QueryBuilder, RequestContext, Result};

use super::{fetch_csv, fetch_json};
use crate::models::Cask;

/// `/casks` endpoints
#[derive(Clone)]
pub struct CasksService {
    transport: Arc<dyn HttpTransport>,
}

impl CasksService {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<ApiResponse<Vec<Cask>>> {
        fetch_json(self.transport.as_ref(), ctx, "/casks.json", QueryBuilder::new()).await
    }

    /// CSV export of the same listing
    pub async fn list_csv(&self, ctx: &RequestContext) -> Result<ApiResponse<Bytes>> {
        fetch_csv(self.transport.as_ref(), ctx, "/casks.csv", QueryBuilder::new()).await
    }
}
