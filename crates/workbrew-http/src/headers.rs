//! Header merging

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{Result, WorkbrewError};

/// Name of the API version header
pub const API_VERSION_HEADER: &str = "X-Workbrew-API-Version";

/// Merge global and per-request headers.
///
/// Request values replace global values for the same (case-insensitive) name.
/// Empty values are never applied, so an empty request value leaves the
/// global value in place.
pub fn merge_headers<'a, G, R>(global: G, request: R) -> Result<HeaderMap>
where
    G: IntoIterator<Item = (&'a str, &'a str)>,
    R: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut merged = HeaderMap::new();
    for (name, value) in global.into_iter().chain(request) {
        if value.is_empty() {
            continue;
        }
        let (name, value) = parse_header(name, value)?;
        merged.insert(name, value);
    }
    Ok(merged)
}

pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| WorkbrewError::InvalidHeader(format!("invalid header name '{name}'")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| WorkbrewError::InvalidHeader(format!("invalid value for header '{name}'")))?;
    Ok((header_name, header_value))
}
