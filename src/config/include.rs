// src/config/include.rs
use std::{
	collections::BTreeMap,
	fmt,
	path::{Component, Path},
};

use glob::{MatchOptions, Pattern};
use serde::{
	de::{self, MapAccess, Visitor},
	ser::SerializeMap,
	Deserialize, Deserializer, Serialize, Serializer,
};

use crate::error::{ConfigError, ConfigResult};

/// What to do with files matched by an `includeFiles` glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeRule {
	/// `true` packages the file at its own path, `false` keeps it out.
	Include(bool),
	/// Package the file under this target path instead.
	Rewrite(String),
}

impl IncludeRule {
	pub fn is_excluded(&self) -> bool {
		matches!(self, IncludeRule::Include(false))
	}
}

impl fmt::Display for IncludeRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			IncludeRule::Include(b) => write!(f, "{b}"),
			IncludeRule::Rewrite(t) => write!(f, "-> {t}"),
		}
	}
}

impl Serialize for IncludeRule {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			IncludeRule::Include(b) => serializer.serialize_bool(*b),
			IncludeRule::Rewrite(t) => serializer.serialize_str(t),
		}
	}
}

impl<'de> Deserialize<'de> for IncludeRule {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct RuleVisitor;

		impl Visitor<'_> for RuleVisitor {
			type Value = IncludeRule;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("a boolean or a target path string")
			}

			fn visit_bool<E: de::Error>(self, v: bool) -> Result<IncludeRule, E> {
				Ok(IncludeRule::Include(v))
			}

			fn visit_str<E: de::Error>(self, v: &str) -> Result<IncludeRule, E> {
				Ok(IncludeRule::Rewrite(v.to_string()))
			}

			fn visit_string<E: de::Error>(self, v: String) -> Result<IncludeRule, E> {
				Ok(IncludeRule::Rewrite(v))
			}
		}

		deserializer.deserialize_any(RuleVisitor)
	}
}

#[derive(Debug, Clone)]
struct IncludeEntry {
	pattern: Pattern,
	rule: IncludeRule,
}

/// Glob → rule map, sorted by glob. Every key is a compiled, valid pattern.
#[derive(Debug, Clone, Default)]
pub struct IncludeFiles {
	entries: BTreeMap<String, IncludeEntry>,
}

/// `*` stays inside one path segment, `**` crosses them.
pub(crate) const MATCH_OPTIONS: MatchOptions = MatchOptions {
	case_sensitive: true,
	require_literal_separator: true,
	require_literal_leading_dot: false,
};

impl IncludeFiles {
	pub fn new() -> Self {
		Self::default()
	}

	/// Validate and insert a rule, returning the rule it replaced (if any).
	pub fn insert(&mut self, glob: impl Into<String>, rule: IncludeRule) -> ConfigResult<Option<IncludeRule>> {
		let glob = glob.into();
		let field = format!("includeFiles.{glob}");

		if glob.trim().is_empty() {
			return Err(ConfigError::validation(field, "glob pattern must not be empty"));
		}

		if escapes_root(&glob) {
			return Err(ConfigError::validation(field, "glob pattern must not contain '..'"));
		}

		let pattern = Pattern::new(&glob)
			.map_err(|e| ConfigError::validation(&field, format!("invalid glob pattern: {e}")))?;

		if let IncludeRule::Rewrite(target) = &rule {
			if target.trim().is_empty() {
				return Err(ConfigError::validation(&field, "rewrite target must not be empty"));
			}
			if Path::new(target).is_absolute() || target.starts_with('/') {
				return Err(ConfigError::validation(
					&field,
					format!("rewrite target must be a relative path: {target}"),
				));
			}
			if escapes_root(target) {
				return Err(ConfigError::validation(
					&field,
					format!("rewrite target must not contain '..': {target}"),
				));
			}
		}

		Ok(self
			.entries
			.insert(glob, IncludeEntry { pattern, rule })
			.map(|old| old.rule))
	}

	pub fn get(&self, glob: &str) -> Option<&IncludeRule> {
		self.entries.get(glob).map(|e| &e.rule)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &IncludeRule)> {
		self.entries.iter().map(|(k, e)| (k.as_str(), &e.rule))
	}

	/// Rule that applies to a `/`-separated path relative to the project root.
	///
	/// An explicit `false` wins over any `true`/rewrite match; otherwise the
	/// last matching glob in sorted order wins.
	pub fn rule_for(&self, relative: &str) -> Option<(&str, &IncludeRule)> {
		let mut hit = None;
		for (glob, entry) in &self.entries {
			if !entry.pattern.matches_with(relative, MATCH_OPTIONS) {
				continue;
			}
			if entry.rule.is_excluded() {
				return Some((glob.as_str(), &entry.rule));
			}
			hit = Some((glob.as_str(), &entry.rule));
		}
		hit
	}
}

/// Paths stay inside the project root / bundle.
fn escapes_root(path: &str) -> bool {
	path.split(['/', '\\']).any(|seg| seg == "..")
		|| Path::new(path).components().any(|c| matches!(c, Component::ParentDir))
}

impl PartialEq for IncludeFiles {
	fn eq(&self, other: &Self) -> bool {
		self.iter().eq(other.iter())
	}
}

impl Eq for IncludeFiles {}

impl Serialize for IncludeFiles {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.len()))?;
		for (glob, rule) in self.iter() {
			map.serialize_entry(glob, rule)?;
		}
		map.end()
	}
}

/// `includeFiles` exactly as written, before validation.
///
/// Keeps every key it saw more than once so the loader can warn about it.
#[derive(Debug, Default)]
pub(crate) struct RawIncludeFiles {
	pub rules: BTreeMap<String, IncludeRule>,
	pub duplicates: Vec<String>,
}

impl<'de> Deserialize<'de> for RawIncludeFiles {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct RawVisitor;

		impl<'de> Visitor<'de> for RawVisitor {
			type Value = RawIncludeFiles;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("a map of glob patterns to booleans or target paths")
			}

			fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawIncludeFiles, A::Error> {
				let mut out = RawIncludeFiles::default();
				while let Some((glob, rule)) = access.next_entry::<String, IncludeRule>()? {
					// overwrite-last
					if out.rules.insert(glob.clone(), rule).is_some() && !out.duplicates.contains(&glob) {
						out.duplicates.push(glob);
					}
				}
				Ok(out)
			}
		}

		deserializer.deserialize_map(RawVisitor)
	}
}
