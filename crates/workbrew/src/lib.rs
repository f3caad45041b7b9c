//! Workbrew API client
//!
//! Typed access to a Workbrew workspace: devices, Brewfiles, brew commands,
//! installed packages, licenses, vulnerabilities, analytics and events.
//! Every listing is available as decoded JSON and as a raw CSV export.
//!
//! All calls share one [`workbrew_http::Transport`], which handles
//! authentication, retries and error classification.

pub mod client;
pub mod models;
pub mod services;

pub use client::WorkbrewClient;
pub use models::{
    AnalyticsEntry, BrewCommand, BrewCommandRun, BrewConfiguration, BrewTap, Brewfile,
    BrewfileRun, Cask, CreateBrewCommandRequest, CreateBrewfileRequest, Device, DeviceGroup,
    Event, EventFilter, Formula, License, MessageResponse, UpdateBrewfileRequest, Vulnerability,
    VulnerabilityChange, VulnerabilityDetail,
};
pub use services::{
    AnalyticsService, BrewCommandRunsService, BrewCommandsService, BrewConfigurationsService,
    BrewTapsService, BrewfilesService, CasksService, DeviceGroupsService, DevicesService,
    EventsService, FormulaeService, LicensesService, VulnerabilitiesService,
    VulnerabilityChangesService,
};

pub use workbrew_http::{
    ApiError, ApiResponse, AuthManager, CancellationToken, ErrorKind, RateLimit, RequestContext,
    Response, Result, TransportConfig, WorkbrewError,
};
