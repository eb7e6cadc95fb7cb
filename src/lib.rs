pub mod bootstrap;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod manifest;
pub mod plugin;
pub mod report;

pub use bootstrap::{BootstrapOptions, Environment, MergeStrategy};
pub use config::{BuildModule, ConfigWarning, DeploymentConfig, IncludeFiles, IncludeRule};
pub use error::{ConfigError, ConfigResult, PluginError};
pub use loader::{ConfigLoader, DescriptorFormat, DescriptorSource};
pub use manifest::{EntryKind, Manifest, ManifestEntry};
pub use plugin::{Plugin, PluginOptions, PluginRegistry};
