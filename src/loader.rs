//! Descriptor loading: read -> parse -> validate -> default-fill.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    config::{DeploymentConfig, RawDescriptor},
    error::{ConfigError, ConfigResult},
};

/// File names tried by [`ConfigLoader::locate`], in order.
pub const DEFAULT_DESCRIPTOR_NAMES: [&str; 2] = ["edgecfg.toml", "edgecfg.json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Toml,
    Json,
}

impl DescriptorFormat {
    /// `.json` is JSON; everything else is read as TOML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => DescriptorFormat::Json,
            _ => DescriptorFormat::Toml,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DescriptorSource {
    Path(PathBuf),
    Text {
        text: String,
        format: DescriptorFormat,
    },
    Value(serde_json::Value),
}

impl DescriptorSource {
    pub fn toml(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            format: DescriptorFormat::Toml,
        }
    }

    pub fn json(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            format: DescriptorFormat::Json,
        }
    }

    fn display_name(&self) -> String {
        match self {
            DescriptorSource::Path(p) => p.display().to_string(),
            DescriptorSource::Text { format, .. } => match format {
                DescriptorFormat::Toml => "<inline toml>".to_string(),
                DescriptorFormat::Json => "<inline json>".to_string(),
            },
            DescriptorSource::Value(_) => "<in-memory descriptor>".to_string(),
        }
    }
}

impl From<PathBuf> for DescriptorSource {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}

impl From<&Path> for DescriptorSource {
    fn from(p: &Path) -> Self {
        Self::Path(p.to_path_buf())
    }
}

impl From<serde_json::Value> for DescriptorSource {
    fn from(v: serde_json::Value) -> Self {
        Self::Value(v)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a descriptor into a validated, immutable [`DeploymentConfig`].
    ///
    /// Either fully succeeds or fails; the only side effect is reading the
    /// descriptor file when the source is a path.
    pub fn load(source: impl Into<DescriptorSource>) -> ConfigResult<DeploymentConfig> {
        let source = source.into();
        let name = source.display_name();
        let mut unknown: Vec<String> = Vec::new();

        let raw = match &source {
            DescriptorSource::Path(path) => {
                let text =
                    fs::read_to_string(path).map_err(|e| ConfigError::from_read(path.clone(), e))?;
                parse_text(&text, DescriptorFormat::from_path(path), &name, &mut unknown)?
            }
            DescriptorSource::Text { text, format } => parse_text(text, *format, &name, &mut unknown)?,
            DescriptorSource::Value(value) => parse_value(value.clone(), &name, &mut unknown)?,
        };

        let config = DeploymentConfig::from_raw(raw, unknown)?;

        for w in config.warnings() {
            warn!(source = %name, "{w}");
        }
        debug!(
            source = %name,
            connector = config.connector_name(),
            include_node_modules = config.include_node_modules(),
            include_files = config.include_files().len(),
            build_modules = config.build_modules().len(),
            "loaded deployment config"
        );

        Ok(config)
    }

    /// Find the default descriptor in `project_root`.
    pub fn locate(project_root: &Path) -> ConfigResult<PathBuf> {
        for name in DEFAULT_DESCRIPTOR_NAMES {
            let p = project_root.join(name);
            if p.is_file() {
                return Ok(p);
            }
        }
        Err(ConfigError::FileNotFound {
            path: project_root.join(DEFAULT_DESCRIPTOR_NAMES[0]),
        })
    }
}

fn parse_text(
    text: &str,
    format: DescriptorFormat,
    name: &str,
    unknown: &mut Vec<String>,
) -> ConfigResult<RawDescriptor> {
    match format {
        DescriptorFormat::Json => {
            // Straight from the text so duplicate keys reach the includeFiles visitor.
            let mut de = serde_json::Deserializer::from_str(text);
            let raw = deserialize_tracked(&mut de, name, unknown)?;
            de.end().map_err(|e| ConfigError::parse(name, e))?;
            Ok(raw)
        }
        DescriptorFormat::Toml => {
            // From the document itself so errors keep toml's line/column.
            let de = toml::de::Deserializer::new(text);
            deserialize_tracked(de, name, unknown)
        }
    }
}

fn parse_value(
    value: serde_json::Value,
    name: &str,
    unknown: &mut Vec<String>,
) -> ConfigResult<RawDescriptor> {
    deserialize_tracked(value, name, unknown)
}

/// Deserialize while recording ignored keys and the key path of a failure.
fn deserialize_tracked<'de, D>(
    de: D,
    name: &str,
    unknown: &mut Vec<String>,
) -> ConfigResult<RawDescriptor>
where
    D: serde::Deserializer<'de>,
{
    let mut track = serde_path_to_error::Track::new();
    let tracked = serde_path_to_error::Deserializer::new(de, &mut track);

    match serde_ignored::deserialize(tracked, |p| unknown.push(p.to_string())) {
        Ok(raw) => Ok(raw),
        Err(e) => {
            let path = track.path().to_string();
            let message = if path == "." {
                e.to_string()
            } else {
                format!("{path}: {e}")
            };
            Err(ConfigError::parse(name, message))
        }
    }
}
