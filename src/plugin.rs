//! Build-plugin registry.
//!
//! The host registers plugins by name; `buildModules` entries in the
//! descriptor are dispatched to them with their option bags. The registry
//! never looks inside the options.

use std::{collections::BTreeMap, fmt};

use tracing::debug;

use crate::{config::DeploymentConfig, error::PluginError};

pub type PluginOptions = serde_json::Map<String, serde_json::Value>;

pub trait Plugin {
    fn name(&self) -> &str;

    fn configure(&mut self, options: &PluginOptions) -> Result<(), PluginError>;
}

#[derive(Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<(), PluginError> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(PluginError::AlreadyRegistered(name));
        }
        debug!(plugin = %name, "registered build plugin");
        self.plugins.insert(name, plugin);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(|p| p.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn configure(&mut self, name: &str, options: &PluginOptions) -> Result<(), PluginError> {
        let plugin = self
            .plugins
            .get_mut(name)
            .ok_or_else(|| PluginError::UnknownPlugin(name.to_string()))?;
        plugin.configure(options)
    }

    /// Configure every build module of `config`, in declaration order.
    /// Stops at the first failure.
    pub fn configure_all(&mut self, config: &DeploymentConfig) -> Result<usize, PluginError> {
        for m in config.build_modules() {
            self.configure(&m.name, &m.options)?;
            debug!(plugin = %m.name, options = m.options.len(), "configured build plugin");
        }
        Ok(config.build_modules().len())
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}
