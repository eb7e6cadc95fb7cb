use clap::ValueEnum;

use crate::{
    config::DeploymentConfig,
    manifest::{EntryKind, Manifest},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportMode {
    Summary,
    Full,
    Json,
}

pub fn render(cfg: &DeploymentConfig, mode: ReportMode) -> serde_json::Result<String> {
    match mode {
        ReportMode::Summary => Ok(summary(cfg)),
        ReportMode::Full => Ok(format!("{cfg:#?}\n")),
        ReportMode::Json => serde_json::to_string_pretty(cfg).map(|s| s + "\n"),
    }
}

fn summary(cfg: &DeploymentConfig) -> String {
    let mut out = String::new();

    out.push_str("edgecfg deployment config\n");
    out.push_str("=========================\n");
    out.push_str(&format!("connector: {}\n", cfg.connector_name()));
    out.push_str(&format!("include_node_modules: {}\n", cfg.include_node_modules()));

    out.push_str(&format!("\ninclude_files: {}\n", cfg.include_files().len()));
    for (glob, rule) in cfg.include_files().iter() {
        out.push_str(&format!("  - {glob}: {rule}\n"));
    }

    if !cfg.build_modules().is_empty() {
        out.push_str(&format!("\nbuild_modules: {}\n", cfg.build_modules().len()));
        for m in cfg.build_modules() {
            if m.options.is_empty() {
                out.push_str(&format!("  - {}\n", m.name));
            } else {
                let opts = serde_json::Value::Object(m.options.clone());
                out.push_str(&format!("  - {} {}\n", m.name, opts));
            }
        }
    }

    if !cfg.warnings().is_empty() {
        out.push_str("\nwarnings\n");
        for w in cfg.warnings() {
            out.push_str(&format!("  ! {w}\n"));
        }
    }

    out
}

pub fn render_manifest(manifest: &Manifest) -> String {
    let mut out = String::new();

    out.push_str(&format!("\nmanifest: {} entries\n", manifest.len()));
    for e in manifest.iter() {
        let tag = match e.kind {
            EntryKind::File => "file",
            EntryKind::Package => "pkg ",
        };
        if e.source == e.target {
            out.push_str(&format!("  {tag} {}\n", e.source.display()));
        } else {
            out.push_str(&format!(
                "  {tag} {} -> {}\n",
                e.source.display(),
                e.target.display()
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{ConfigLoader, DescriptorSource};

    fn sample() -> DeploymentConfig {
        ConfigLoader::load(DescriptorSource::json(
            r#"{
                "connectorName": "@edgio/nuxt",
                "includeNodeModules": true,
                "includeFiles": { ".env.vault": true, "build/*.map": "maps" },
                "buildModules": [["@edgio/nuxt/module", { "edgioSourceMaps": true }]],
                "region": "eu"
            }"#,
        ))
        .unwrap()
    }

    #[test]
    fn summary_lists_every_section() {
        let out = render(&sample(), ReportMode::Summary).unwrap();

        assert!(out.contains("connector: @edgio/nuxt\n"));
        assert!(out.contains("include_node_modules: true\n"));
        assert!(out.contains("  - .env.vault: true\n"));
        assert!(out.contains("  - build/*.map: -> maps\n"));
        assert!(out.contains("  - @edgio/nuxt/module {\"edgioSourceMaps\":true}\n"));
        assert!(out.contains("unknown key 'region' was ignored"));
    }

    #[test]
    fn json_round_trips_through_loader() {
        let cfg = sample();
        let json = render(&cfg, ReportMode::Json).unwrap();
        let again = ConfigLoader::load(DescriptorSource::json(json)).unwrap();
        assert_eq!(cfg, again);
        assert!(again.warnings().is_empty());
    }

    #[test]
    fn manifest_rendering_marks_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("build")).unwrap();
        std::fs::write(dir.path().join("build/app.js.map"), "{}").unwrap();
        std::fs::write(dir.path().join(".env.vault"), "v").unwrap();

        let m = Manifest::collect(&sample(), dir.path()).unwrap();
        let out = render_manifest(&m);

        assert!(out.contains("manifest: 2 entries"));
        assert!(out.contains("  file .env.vault\n"));
        assert!(out.contains("-> maps"));
    }
}
