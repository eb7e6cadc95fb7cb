// src/config/mod.rs

pub mod include;
pub mod modules;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use include::{IncludeFiles, IncludeRule};
pub use modules::BuildModule;

use crate::error::{ConfigError, ConfigResult};
use include::RawIncludeFiles;
use modules::RawBuildModule;

/// Descriptor as written, before validation and default-filling.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDescriptor {
	#[serde(default, alias = "connector")]
	pub connector_name: Option<String>,

	#[serde(default)]
	pub include_node_modules: bool,

	#[serde(default)]
	pub include_files: RawIncludeFiles,

	#[serde(default)]
	pub build_modules: Vec<RawBuildModule>,
}

/// Non-fatal findings collected while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
	UnknownKey { path: String },
	DuplicateGlob { glob: String },
}

impl fmt::Display for ConfigWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigWarning::UnknownKey { path } => write!(f, "unknown key '{path}' was ignored"),
			ConfigWarning::DuplicateGlob { glob } => {
				write!(f, "includeFiles glob '{glob}' is declared more than once; the last value wins")
			}
		}
	}
}

/// Validated deployment settings handed to the build/deploy pipeline.
///
/// Read-only: fields are private and only exposed by reference.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
	connector_name: String,
	include_node_modules: bool,
	include_files: IncludeFiles,

	#[serde(skip_serializing_if = "Vec::is_empty")]
	build_modules: Vec<BuildModule>,

	#[serde(skip)]
	warnings: Vec<ConfigWarning>,
}

impl DeploymentConfig {
	pub fn connector_name(&self) -> &str {
		&self.connector_name
	}

	pub fn include_node_modules(&self) -> bool {
		self.include_node_modules
	}

	pub fn include_files(&self) -> &IncludeFiles {
		&self.include_files
	}

	pub fn build_modules(&self) -> &[BuildModule] {
		&self.build_modules
	}

	pub fn warnings(&self) -> &[ConfigWarning] {
		&self.warnings
	}

	pub(crate) fn from_raw(raw: RawDescriptor, unknown_keys: Vec<String>) -> ConfigResult<Self> {
		let connector_name = match raw.connector_name {
			None => return Err(ConfigError::validation("connectorName", "required field is missing")),
			Some(name) if name.trim().is_empty() => {
				return Err(ConfigError::validation("connectorName", "must not be empty"))
			}
			Some(name) => name,
		};

		let mut include_files = IncludeFiles::new();
		for (glob, rule) in raw.include_files.rules {
			include_files.insert(glob, rule)?;
		}

		let mut build_modules = Vec::with_capacity(raw.build_modules.len());
		for (idx, m) in raw.build_modules.into_iter().enumerate() {
			let m = BuildModule::from(m);
			if m.name.trim().is_empty() {
				return Err(ConfigError::validation(
					format!("buildModules[{idx}]"),
					"plugin name must not be empty",
				));
			}
			build_modules.push(m);
		}

		let mut warnings: Vec<ConfigWarning> = unknown_keys
			.into_iter()
			.map(|path| ConfigWarning::UnknownKey { path })
			.collect();
		warnings.extend(
			raw.include_files
				.duplicates
				.into_iter()
				.map(|glob| ConfigWarning::DuplicateGlob { glob }),
		);

		Ok(Self {
			connector_name,
			include_node_modules: raw.include_node_modules,
			include_files,
			build_modules,
			warnings,
		})
	}
}

/// Warnings are diagnostics about the source text, not part of the value.
impl PartialEq for DeploymentConfig {
	fn eq(&self, other: &Self) -> bool {
		self.connector_name == other.connector_name
			&& self.include_node_modules == other.include_node_modules
			&& self.include_files == other.include_files
			&& self.build_modules == other.build_modules
	}
}
