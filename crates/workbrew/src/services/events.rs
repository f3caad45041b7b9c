//! Client and audit-log events

use std::sync::Arc;

use bytes::Bytes;
use workbrew_http::{ApiResponse, HttpTransport, QueryBuilder, RequestContext, Result};

use super::{fetch_csv, fetch_json};
use crate::models::{Event, EventFilter};

/// `/events` endpoints
#[derive(Clone)]
pub struct EventsService {
    transport: Arc<dyn HttpTransport>,
}

impl EventsService {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// List events, optionally restricted to one stream
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: Option<EventFilter>,
    ) -> Result<ApiResponse<Vec<Event>>> {
        fetch_json(self.transport.as_ref(), ctx, "/events.json", filter_query(filter)).await
    }

    pub async fn list_csv(
        &self,
        ctx: &RequestContext,
        filter: Option<EventFilter>,
    ) -> Result<ApiResponse<Bytes>> {
        fetch_csv(self.transport.as_ref(), ctx, "/events.csv", filter_query(filter)).await
    }
}

fn filter_query(filter: Option<EventFilter>) -> QueryBuilder {
    QueryBuilder::new().add_string("filter", filter.map(|f| f.as_str()).unwrap_or_default())
}
