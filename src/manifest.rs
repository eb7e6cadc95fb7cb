//! Preview of the files a deployment config selects.
//!
//! Nothing is copied or bundled; this only answers "what would be shipped,
//! and where would it land".

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    config::{include::MATCH_OPTIONS, DeploymentConfig, IncludeRule},
    error::{ConfigError, ConfigResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    File,
    /// A dependency package directory under `node_modules/`.
    Package,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ManifestEntry {
    /// Relative to the project root.
    pub source: PathBuf,
    /// Location inside the deployed bundle.
    pub target: PathBuf,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn collect(config: &DeploymentConfig, project_root: &Path) -> ConfigResult<Self> {
        let mut matched: BTreeSet<String> = BTreeSet::new();

        for (glob, rule) in config.include_files().iter() {
            if rule.is_excluded() {
                continue;
            }
            matched.extend(expand(project_root, glob)?);
        }

        // One entry per file; the rule that wins for that file decides the target.
        let mut entries: Vec<ManifestEntry> = Vec::with_capacity(matched.len());
        let mut claimed: BTreeMap<PathBuf, (String, String)> = BTreeMap::new();
        for rel in matched {
            let Some((glob, rule)) = config.include_files().rule_for(&rel) else {
                continue;
            };
            let target = match rule {
                IncludeRule::Include(false) => continue,
                IncludeRule::Include(true) => PathBuf::from(&rel),
                IncludeRule::Rewrite(to) => rewrite_target(glob, &rel, to),
            };
            if let Some((other, _)) = claimed.get(&target) {
                return Err(ConfigError::validation(
                    format!("includeFiles.{glob}"),
                    format!(
                        "{} and {rel} would both be shipped as {}",
                        other,
                        target.display()
                    ),
                ));
            }
            claimed.insert(target.clone(), (rel.clone(), glob.to_string()));
            entries.push(ManifestEntry {
                source: PathBuf::from(rel),
                target,
                kind: EntryKind::File,
            });
        }

        if config.include_node_modules() {
            for name in dependency_names(project_root)? {
                let p = Path::new("node_modules").join(&name);
                if let Some((other, glob)) = claimed.get(&p) {
                    return Err(ConfigError::validation(
                        format!("includeFiles.{glob}"),
                        format!("{other} would replace dependency package {}", p.display()),
                    ));
                }
                entries.push(ManifestEntry {
                    source: p.clone(),
                    target: p,
                    kind: EntryKind::Package,
                });
            }
        }

        entries.sort();
        debug!(entries = entries.len(), root = %project_root.display(), "collected manifest");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter()
    }
}

/// Where a rewritten file lands.
///
/// A literal glob names one file, so `to` is that file's new path. A wildcard
/// glob treats `to` as a directory and keeps each match's path below the
/// glob's literal leading directories.
fn rewrite_target(glob: &str, rel: &str, to: &str) -> PathBuf {
    if glob::Pattern::escape(glob) == glob {
        return PathBuf::from(to);
    }

    let prefix: Vec<&str> = glob
        .split('/')
        .take_while(|seg| !seg.contains(['*', '?', '[']))
        .collect();
    let segments: Vec<&str> = rel.split('/').collect();
    let keep = if segments.len() > prefix.len() && segments[..prefix.len()] == prefix[..] {
        &segments[prefix.len()..]
    } else {
        &segments[segments.len().saturating_sub(1)..]
    };

    keep.iter().fold(PathBuf::from(to), |acc, seg| acc.join(seg))
}

/// Files (not directories) under `root` matching `pattern`, as `/`-separated relative paths.
fn expand(root: &Path, pattern: &str) -> ConfigResult<Vec<String>> {
    let root_pattern = glob::Pattern::escape(&root.to_string_lossy());
    let full = format!("{}/{}", root_pattern.trim_end_matches('/'), pattern);

    let paths = glob::glob_with(&full, MATCH_OPTIONS).map_err(|e| {
        ConfigError::validation(format!("includeFiles.{pattern}"), format!("invalid glob pattern: {e}"))
    })?;

    let mut out = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                warn!(pattern, error = %e, "skipping unreadable path");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        out.push(rel);
    }
    Ok(out)
}

/// Names under `dependencies` in the root `package.json`.
fn dependency_names(root: &Path) -> ConfigResult<Vec<String>> {
    let path = root.join("package.json");
    let text = match fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no package.json; no dependency packages");
            return Ok(Vec::new());
        }
        Err(e) => return Err(ConfigError::from_read(path, e)),
    };

    let pkg: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| ConfigError::parse(path.display().to_string(), e))?;

    Ok(pkg
        .get("dependencies")
        .and_then(|d| d.as_object())
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default())
}
