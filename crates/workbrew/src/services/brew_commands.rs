//! Brew commands and their runs

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;
use workbrew_http::{ApiResponse, HttpTransport, QueryBuilder, RequestContext, Result, TransportExt};

use super::{fetch_csv, fetch_json, require, JSON_HEADERS};
use crate::models::{BrewCommand, BrewCommandRun, CreateBrewCommandRequest, MessageResponse};

/// `/brew_commands` endpoints
#[derive(Clone)]
pub struct BrewCommandsService {
    transport: Arc<dyn HttpTransport>,
}

impl BrewCommandsService {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<ApiResponse<Vec<BrewCommand>>> {
        fetch_json(self.transport.as_ref(), ctx, "/brew_commands.json", QueryBuilder::new()).await
    }

    pub async fn list_csv(&self, ctx: &RequestContext) -> Result<ApiResponse<Bytes>> {
        fetch_csv(self.transport.as_ref(), ctx, "/brew_commands.csv", QueryBuilder::new()).await
    }

    /// Schedule a brew command on devices
    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: &CreateBrewCommandRequest,
    ) -> Result<ApiResponse<MessageResponse>> {
        debug!("Scheduling brew {}", request.arguments);
        self.transport
            .post(ctx, "/brew_commands.json", request, JSON_HEADERS)
            .await
    }

    /// Runs of the command identified by `label`
    pub async fn list_runs(
        &self,
        ctx: &RequestContext,
        label: &str,
    ) -> Result<ApiResponse<Vec<BrewCommandRun>>> {
        let label = require(label, "label")?;
        fetch_json(
            self.transport.as_ref(),
            ctx,
            &format!("/brew_commands/{label}/runs.json"),
            QueryBuilder::new(),
        )
        .await
    }

    pub async fn list_runs_csv(&self, ctx: &RequestContext, label: &str) -> Result<ApiResponse<Bytes>> {
        let label = require(label, "label")?;
        fetch_csv(
            self.transport.as_ref(),
            ctx,
            &format!("/brew_commands/{label}/runs.csv"),
            QueryBuilder::new(),
        )
        .await
    }
}
