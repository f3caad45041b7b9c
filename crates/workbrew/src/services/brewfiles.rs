//! Brewfiles and their runs

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;
use workbrew_http::{ApiResponse, HttpTransport, QueryBuilder, RequestContext, Result, TransportExt};

use super::{fetch_csv, fetch_json, require, JSON_HEADERS};
use crate::models::{
    Brewfile, BrewfileRun, CreateBrewfileRequest, MessageResponse, UpdateBrewfileRequest,
};

/// `/brewfiles` endpoints
///
/// Brewfiles are addressed by label. An empty label fails with
/// `MissingParameter("label")` before any request is sent.
#[derive(Clone)]
pub struct BrewfilesService {
    transport: Arc<dyn HttpTransport>,
}

impl BrewfilesService {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<ApiResponse<Vec<Brewfile>>> {
        fetch_json(self.transport.as_ref(), ctx, "/brewfiles.json", QueryBuilder::new()).await
    }

    pub async fn list_csv(&self, ctx: &RequestContext) -> Result<ApiResponse<Bytes>> {
        fetch_csv(self.transport.as_ref(), ctx, "/brewfiles.csv", QueryBuilder::new()).await
    }

    /// Create a Brewfile
    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: &CreateBrewfileRequest,
    ) -> Result<ApiResponse<MessageResponse>> {
        debug!("Creating Brewfile {}", request.label);
        self.transport
            .post(ctx, "/brewfiles.json", request, JSON_HEADERS)
            .await
    }

    /// Replace the contents of an existing Brewfile
    pub async fn update(
        &self,
        ctx: &RequestContext,
        label: &str,
        request: &UpdateBrewfileRequest,
    ) -> Result<ApiResponse<MessageResponse>> {
        let label = require(label, "label")?;
        self.transport
            .put(ctx, &format!("/brewfiles/{label}.json"), request, JSON_HEADERS)
            .await
    }

    pub async fn delete(
        &self,
        ctx: &RequestContext,
        label: &str,
    ) -> Result<ApiResponse<MessageResponse>> {
        let label = require(label, "label")?;
        debug!("Deleting Brewfile {label}");
        self.transport
            .delete(
                ctx,
                &format!("/brewfiles/{label}.json"),
                QueryBuilder::new(),
                JSON_HEADERS,
            )
            .await
    }

    /// Runs of one Brewfile
    pub async fn list_runs(
        &self,
        ctx: &RequestContext,
        label: &str,
    ) -> Result<ApiResponse<Vec<BrewfileRun>>> {
        let label = require(label, "label")?;
        fetch_json(
            self.transport.as_ref(),
            ctx,
            &format!("/brewfiles/{label}/runs.json"),
            QueryBuilder::new(),
        )
        .await
    }

    pub async fn list_runs_csv(&self, ctx: &RequestContext, label: &str) -> Result<ApiResponse<Bytes>> {
        let label = require(label, "label")?;
        fetch_csv(
            self.transport.as_ref(),
            ctx,
            &format!("/brewfiles/{label}/runs.csv"),
            QueryBuilder::new(),
        )
        .await
    }
}
