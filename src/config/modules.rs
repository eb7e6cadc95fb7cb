// src/config/modules.rs
use serde::{ser::SerializeTuple, Deserialize, Serialize, Serializer};

use crate::plugin::PluginOptions;

/// A build plugin to register, with its opaque option bag.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildModule {
	pub name: String,
	pub options: PluginOptions,
}

impl BuildModule {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			options: PluginOptions::new(),
		}
	}

	pub fn with_options(name: impl Into<String>, options: PluginOptions) -> Self {
		Self {
			name: name.into(),
			options,
		}
	}
}

/// Written back in descriptor shape so a serialized config loads again.
impl Serialize for BuildModule {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		if self.options.is_empty() {
			return serializer.serialize_str(&self.name);
		}
		let mut pair = serializer.serialize_tuple(2)?;
		pair.serialize_element(&self.name)?;
		pair.serialize_element(&self.options)?;
		pair.end()
	}
}

/// `buildModules` entries: `"name"` or `["name", { ...options }]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawBuildModule {
	Name(String),
	WithOptions(String, PluginOptions),
}

impl From<RawBuildModule> for BuildModule {
	fn from(raw: RawBuildModule) -> Self {
		match raw {
			RawBuildModule::Name(name) => BuildModule::new(name),
			RawBuildModule::WithOptions(name, options) => BuildModule::with_options(name, options),
		}
	}
}
