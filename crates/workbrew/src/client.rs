//! Workbrew client facade

use std::sync::Arc;

use tracing::debug;
use workbrew_http::{AuthManager, HttpTransport, Result, Transport, TransportConfig};

use crate::services::{
    AnalyticsService, BrewCommandRunsService, BrewCommandsService, BrewConfigurationsService,
    BrewTapsService, BrewfilesService, CasksService, DeviceGroupsService, DevicesService,
    EventsService, FormulaeService, LicensesService, VulnerabilitiesService,
    VulnerabilityChangesService,
};

/// Entry point to the Workbrew API
///
/// Cloning is cheap; every clone and every service shares one transport.
///
/// ```no_run
/// use workbrew::{RequestContext, TransportConfig, WorkbrewClient};
///
/// # async fn run() -> workbrew::Result<()> {
/// let client = WorkbrewClient::new(TransportConfig::new("api-key", "my-workspace"))?;
/// let devices = client.devices().list(&RequestContext::new()).await?;
/// println!("{} devices", devices.data.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WorkbrewClient {
    transport: Arc<dyn HttpTransport>,
    auth: Option<Arc<AuthManager>>,
}

impl WorkbrewClient {
    /// Build a client with its own reqwest transport
    pub fn new(config: TransportConfig) -> Result<Self> {
        let transport = Transport::new(config)?;
        let auth = transport.shared_auth();
        debug!("Workbrew client created");
        Ok(Self {
            transport: Arc::new(transport),
            auth: Some(auth),
        })
    }

    /// Build a client from `WORKBREW_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(TransportConfig::from_env()?)
    }

    /// Wrap an existing transport, e.g. a test double
    pub fn from_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            auth: None,
        }
    }

    /// Credentials of a client built by [`WorkbrewClient::new`]
    ///
    /// `None` when the client wraps a caller-supplied transport.
    pub fn auth(&self) -> Option<&AuthManager> {
        self.auth.as_deref()
    }

    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }

    pub fn analytics(&self) -> AnalyticsService {
        AnalyticsService::new(self.transport())
    }

    pub fn brew_commands(&self) -> BrewCommandsService {
        BrewCommandsService::new(self.transport())
    }

    pub fn brew_command_runs(&self) -> BrewCommandRunsService {
        BrewCommandRunsService::new(self.transport())
    }

    pub fn brew_configurations(&self) -> BrewConfigurationsService {
        BrewConfigurationsService::new(self.transport())
    }

    pub fn brew_taps(&self) -> BrewTapsService {
        BrewTapsService::new(self.transport())
    }

    pub fn brewfiles(&self) -> BrewfilesService {
        BrewfilesService::new(self.transport())
    }

    pub fn casks(&self) -> CasksService {
        CasksService::new(self.transport())
    }

    pub fn device_groups(&self) -> DeviceGroupsService {
        DeviceGroupsService::new(self.transport())
    }

    pub fn devices(&self) -> DevicesService {
        DevicesService::new(self.transport())
    }

    pub fn events(&self) -> EventsService {
        EventsService::new(self.transport())
    }

    pub fn formulae(&self) -> FormulaeService {
        FormulaeService::new(self.transport())
    }

    pub fn licenses(&self) -> LicensesService {
        LicensesService::new(self.transport())
    }

    pub fn vulnerabilities(&self) -> VulnerabilitiesService {
        VulnerabilitiesService::new(self.transport())
    }

    pub fn vulnerability_changes(&self) -> VulnerabilityChangesService {
        VulnerabilityChangesService::new(self.transport())
    }
}
