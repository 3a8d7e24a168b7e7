//! Query panel client library: the panel view-model, the backend HTTP
//! client, config and logging. Used by the `query-panel` terminal front-end.

pub mod client;
pub mod config;
pub mod logging;
pub mod messages;
pub mod panel;

pub use client::{ClientError, QueryClient};
pub use config::{default_config_path, BackendSection, Config, ConfigError, LoggingSection};
pub use messages::{QueryResponse, TableInfo};
pub use panel::{PanelStatus, PanelView, QueryPanel, Renderer};
