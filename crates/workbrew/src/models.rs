//! Workbrew Data Models
//!
//! Response structs are lenient: fields the console omits fall back to their
//! defaults so additions on the server side do not break decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A managed Mac
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    /// Hardware serial number
    pub serial_number: String,
    /// Device groups the device belongs to
    pub groups: Vec<String>,
    /// MDM user or device name
    pub mdm_user_or_device_name: Option<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub command_last_run_at: Option<DateTime<Utc>>,
    pub operating_system: Option<String>,
    pub homebrew_prefix: Option<String>,
    pub homebrew_version: Option<String>,
    pub workbrew_version: Option<String>,
    pub formulae_count: u64,
    pub casks_count: u64,
}

/// A Brewfile distributed to devices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brewfile {
    pub label: String,
    pub last_updated_by_user: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Serial numbers of the targeted devices
    pub devices: Vec<String>,
    pub run_count: u64,
}

/// One execution of a Brewfile on one device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewfileRun {
    pub label: String,
    pub device: String,
    pub success: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub output: Option<String>,
}

/// A `brew` command scheduled on devices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewCommand {
    /// Full command line, e.g. `brew upgrade`
    pub command: String,
    pub label: String,
    pub last_updated_by_user: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub devices: Vec<String>,
    pub run_count: u64,
}

/// One execution of a brew command on one device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewCommandRun {
    pub command: String,
    pub label: String,
    pub device: String,
    pub success: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub output: Option<String>,
}

/// A configuration value applied through Workbrew
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewConfiguration {
    pub key: String,
    pub value: String,
    pub last_updated_by_user: Option<String>,
    pub device_group: Option<String>,
}

/// A tap installed on at least one device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewTap {
    pub tap: String,
    pub devices: Vec<String>,
    pub formulae: Vec<String>,
    pub casks: Vec<String>,
    pub available_packages: Option<String>,
}

/// An installed formula
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Formula {
    pub name: String,
    pub devices: Vec<String>,
    pub outdated: bool,
    pub installed_on_request: bool,
    pub installed_as_dependency: bool,
    pub vulnerabilities: Vec<String>,
    pub deprecated: bool,
    pub license: Option<String>,
    pub homebrew_core_version: Option<String>,
}

/// An installed cask
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cask {
    pub name: String,
    pub display_name: Option<String>,
    pub devices: Vec<String>,
    pub outdated: bool,
    pub deprecated: bool,
    pub homebrew_cask_version: Option<String>,
}

/// A software license and the formulae that use it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub name: String,
    pub devices: u64,
    pub formulae: u64,
}

/// Known vulnerabilities for one formula
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vulnerability {
    pub formula: String,
    pub outdated_devices: Vec<String>,
    pub vulnerabilities: Vec<VulnerabilityDetail>,
    pub supported: bool,
}

/// A single CVE entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityDetail {
    pub id: String,
    pub cvss_score: Option<f64>,
    pub summary: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub fixed_versions: Vec<String>,
}

/// A vulnerability appearing on or disappearing from the fleet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityChange {
    pub formula: String,
    pub device: String,
    /// Change kind, e.g. `introduced` or `resolved`
    pub change: String,
    pub vulnerabilities: Vec<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Audit or client event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub id: String,
    pub event_type: String,
    pub occurred_at: Option<DateTime<Utc>>,
    pub actor: Option<String>,
    pub actor_type: Option<String>,
    pub target: Option<String>,
    pub target_type: Option<String>,
}

/// Which event stream to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFilter {
    /// Events reported by devices
    Client,
    /// Console actions by users
    AuditLog,
}

impl EventFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventFilter::Client => "client",
            EventFilter::AuditLog => "audit_log",
        }
    }
}

/// Command usage analytics for one device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsEntry {
    pub device: String,
    pub command: String,
    pub last_run: Option<DateTime<Utc>>,
    pub count: u64,
}

/// A group of devices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceGroup {
    pub id: String,
    pub name: String,
    pub devices: Vec<String>,
}

/// Body of `POST /brewfiles.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBrewfileRequest {
    pub label: String,
    /// Brewfile contents
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_serial_numbers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_group_id: Option<String>,
}

impl CreateBrewfileRequest {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
            device_serial_numbers: None,
            device_group_id: None,
        }
    }
}

/// Body of `PUT /brewfiles/{label}.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBrewfileRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_serial_numbers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_group_id: Option<String>,
}

/// Body of `POST /brew_commands.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateBrewCommandRequest {
    /// Arguments after `brew`, e.g. `upgrade --greedy`
    pub arguments: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_after_datetime: Option<DateTime<Utc>>,
    /// `once`, `daily`, `weekly` or `monthly`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
}

/// Acknowledgement returned by mutating endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_tolerates_missing_fields() {
        let device: Device = serde_json::from_value(json!({
            "serial_number": "C02XYZ",
            "groups": ["engineering"],
            "last_seen_at": "2024-03-01T12:00:00Z",
            "unknown_field": 1
        }))
        .unwrap();

        assert_eq!(device.serial_number, "C02XYZ");
        assert_eq!(device.groups, vec!["engineering".to_string()]);
        assert!(device.last_seen_at.is_some());
        assert_eq!(device.formulae_count, 0);
        assert!(device.homebrew_version.is_none());
    }

    #[test]
    fn test_create_brewfile_skips_unset_targets() {
        let body = serde_json::to_value(CreateBrewfileRequest::new("base", "brew \"git\"")).unwrap();
        assert_eq!(body, json!({"label": "base", "content": "brew \"git\""}));
    }

    #[test]
    fn test_brew_command_request_serializes_schedule() {
        let request = CreateBrewCommandRequest {
            arguments: "upgrade".to_string(),
            run_after_datetime: Some("2024-05-01T09:00:00Z".parse().unwrap()),
            recurrence: Some("weekly".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["arguments"], "upgrade");
        assert_eq!(body["recurrence"], "weekly");
        assert_eq!(body["run_after_datetime"], "2024-05-01T09:00:00Z");
        assert!(body.get("device_ids").is_none());
    }

    #[test]
    fn test_event_filter_wire_names() {
        assert_eq!(EventFilter::AuditLog.as_str(), "audit_log");
        assert_eq!(serde_json::to_value(EventFilter::Client).unwrap(), json!("client"));
    }
}
