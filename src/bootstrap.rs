//! One-time environment initialization.
//!
//! Runs before any config-dependent code: snapshots the process
//! environment and merges a dotenv-style secrets file into it.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Existing non-empty values win.
    #[default]
    FillMissing,
    Override,
}

#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub env_file: PathBuf,

    /// Fail with `FileNotFound` when the env file is absent.
    pub required: bool,

    pub strategy: MergeStrategy,

    /// Also write file-provided values into the process environment.
    pub export: bool,
}

impl BootstrapOptions {
    pub fn new(env_file: impl Into<PathBuf>) -> Self {
        Self {
            env_file: env_file.into(),
            required: false,
            strategy: MergeStrategy::FillMissing,
            export: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
    file_keys: BTreeSet<String>,
    /// File keys whose value actually ended up in `vars`.
    applied_keys: BTreeSet<String>,
    source: Option<PathBuf>,
}

impl Environment {
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Keys whose values came from the env file; reports hide these.
    pub fn redacted_keys(&self) -> impl Iterator<Item = &str> {
        self.file_keys.iter().map(String::as_str)
    }

    /// Merge an env file. Returns how many keys it defined.
    ///
    /// A missing file is fine unless `required` is set.
    pub fn merge_file(&mut self, path: &Path, strategy: MergeStrategy, required: bool) -> ConfigResult<usize> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                debug!(path = %path.display(), "no env file; skipping");
                return Ok(0);
            }
            Err(e) => return Err(ConfigError::from_read(path.to_path_buf(), e)),
        };

        let n = self.merge_text(&text, &path.display().to_string(), strategy)?;
        self.source = Some(path.to_path_buf());
        Ok(n)
    }

    pub fn merge_text(&mut self, text: &str, source_name: &str, strategy: MergeStrategy) -> ConfigResult<usize> {
        let incoming = parse_env_text(text, source_name)?;
        let n = incoming.len();
        self.file_keys.extend(incoming.keys().cloned());
        let applied = apply_strategy(&mut self.vars, incoming, strategy);
        self.applied_keys.extend(applied);
        Ok(n)
    }

    /// Values the env file contributed; process values that won are left alone.
    fn exported_vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.applied_keys
            .iter()
            .filter_map(|k| self.vars.get(k).map(|v| (k.as_str(), v.as_str())))
    }

    fn export_file_keys(&self) {
        for (k, v) in self.exported_vars() {
            std::env::set_var(k, v);
        }
    }

    pub fn debug_dump(&self, redact: bool) -> String {
        let mut out = String::new();

        out.push_str("edgecfg environment (debug)\n");
        out.push_str("===========================\n");
        out.push_str(&format!(
            "env_file: {}\n",
            self.source
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| "<unset>".to_string())
        ));

        out.push_str("\nvars:\n");
        for (k, v) in &self.vars {
            let should_redact = redact && (looks_sensitive_key(k) || self.file_keys.contains(k));
            if should_redact {
                out.push_str(&format!("  {} = <redacted>\n", k));
            } else {
                out.push_str(&format!("  {} = {}\n", k, v));
            }
        }

        out
    }
}

/// Initialize the process environment exactly once.
///
/// Later calls return the environment built by the first call.
pub fn init(opts: &BootstrapOptions) -> ConfigResult<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        debug!("environment already initialized; ignoring repeated bootstrap");
        return Ok(env);
    }

    let mut env = Environment::from_process();
    let n = env.merge_file(&opts.env_file, opts.strategy, opts.required)?;
    if n > 0 {
        info!(path = %opts.env_file.display(), keys = n, "loaded env file");
    }

    let env = ENVIRONMENT.get_or_init(|| env);
    if opts.export {
        env.export_file_keys();
    }
    Ok(env)
}

/// The environment set up by [`init`], if it has run.
pub fn environment() -> Option<&'static Environment> {
    ENVIRONMENT.get()
}

/// Returns the keys whose incoming value was written.
fn apply_strategy(
    dst: &mut BTreeMap<String, String>,
    src: BTreeMap<String, String>,
    strategy: MergeStrategy,
) -> Vec<String> {
    let mut applied = Vec::with_capacity(src.len());
    for (k, v) in src {
        let take = match strategy {
            MergeStrategy::FillMissing => dst.get(&k).map(|s| s.is_empty()).unwrap_or(true),
            MergeStrategy::Override => true,
        };
        if take {
            dst.insert(k.clone(), v);
            applied.push(k);
        }
    }
    applied
}

fn parse_env_text(text: &str, source_name: &str) -> ConfigResult<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();

    for (idx, line) in text.lines().enumerate() {
        let mut s = line.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }

        if let Some(rest) = s.strip_prefix("export ") {
            s = rest.trim();
        }

        let (k, v) = s.split_once('=').ok_or_else(|| {
            ConfigError::parse(
                source_name,
                format!("invalid env line {} (expected KEY=VALUE): {}", idx + 1, line),
            )
        })?;

        let key = k.trim();
        if key.is_empty() {
            return Err(ConfigError::parse(
                source_name,
                format!("invalid env line {}: empty key", idx + 1),
            ));
        }

        let mut val = v.trim();
        if val.len() >= 2 {
            let bytes = val.as_bytes();
            let first = bytes[0];
            let last = bytes[bytes.len() - 1];
            if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
                val = &val[1..val.len() - 1];
            }
        }
        out.insert(key.to_string(), val.to_string());
    }

    Ok(out)
}

fn looks_sensitive_key(k: &str) -> bool {
    let u = k.to_ascii_uppercase();
    u.contains("TOKEN")
        || u.contains("SECRET")
        || u.contains("PASSWORD")
        || u.contains("PRIVATE")
        || u.ends_with("_KEY")
}
