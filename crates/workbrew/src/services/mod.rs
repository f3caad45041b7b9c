//! Per-resource services
//!
//! Every service is a thin wrapper over the shared [`HttpTransport`]: it builds
//! the endpoint path, attaches the fixed `Accept`/`Content-Type` headers and
//! hands the call to the matching transport verb. Errors propagate unchanged.

mod analytics;
mod brew_command_runs;
mod brew_commands;
mod brew_configurations;
mod brew_taps;
mod brewfiles;
mod casks;
mod device_groups;
mod devices;
mod events;
mod formulae;
mod licenses;
mod vulnerabilities;
mod vulnerability_changes;

pub use analytics::AnalyticsService;
pub use brew_command_runs::BrewCommandRunsService;
pub use brew_commands::BrewCommandsService;
pub use brew_configurations::BrewConfigurationsService;
pub use brew_taps::BrewTapsService;
pub use brewfiles::BrewfilesService;
pub use casks::CasksService;
pub use device_groups::DeviceGroupsService;
pub use devices::DevicesService;
pub use events::EventsService;
pub use formulae::FormulaeService;
pub use licenses::LicensesService;
pub use vulnerabilities::VulnerabilitiesService;
pub use vulnerability_changes::VulnerabilityChangesService;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use workbrew_http::{
    ApiResponse, HttpTransport, QueryBuilder, RequestContext, Result, TransportExt, WorkbrewError,
};

/// Headers sent with every JSON call
pub(crate) const JSON_HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/json"),
    ("Content-Type", "application/json"),
];

/// Headers sent with every CSV export
pub(crate) const CSV_HEADERS: &[(&str, &str)] = &[("Accept", "text/csv")];

/// Validate a path parameter and percent-encode it for the URL
pub(crate) fn require(value: &str, name: &'static str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(WorkbrewError::MissingParameter(name));
    }
    Ok(urlencoding::encode(value).into_owned())
}

pub(crate) async fn fetch_json<T>(
    transport: &dyn HttpTransport,
    ctx: &RequestContext,
    endpoint: &str,
    query: QueryBuilder,
) -> Result<ApiResponse<T>>
where
    T: DeserializeOwned + Default + Send,
{
    transport.get(ctx, endpoint, query, JSON_HEADERS).await
}

/// CSV exports are returned as the raw body, unparsed
pub(crate) async fn fetch_csv(
    transport: &dyn HttpTransport,
    ctx: &RequestContext,
    endpoint: &str,
    query: QueryBuilder,
) -> Result<ApiResponse<Bytes>> {
    let response = transport
        .get_bytes(ctx, endpoint, query, CSV_HEADERS)
        .await?;
    Ok(ApiResponse {
        data: response.body.clone(),
        response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_blank() {
        let err = require("  ", "label").unwrap_err();
        assert!(matches!(err, WorkbrewError::MissingParameter("label")));
        assert_eq!(err.to_string(), "label is required");
    }

    #[test]
    fn test_require_encodes() {
        assert_eq!(require("base", "label").unwrap(), "base");
        assert_eq!(require("team a/b", "label").unwrap(), "team%20a%2Fb");
    }
}
