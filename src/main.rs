mod cli;

use anyhow::{Context as _, Result};
use clap::Parser;
use edgecfg::{
    bootstrap::{self, BootstrapOptions, MergeStrategy},
    report, ConfigLoader, Manifest,
};

fn main() -> Result<()> {
    let args = cli::Args::parse();
    edgecfg::logging::init(args.verbose);

    let project_dir = match &args.project_dir {
        Some(p) => p.clone(),
        None => std::env::current_dir().context("could not determine current directory")?,
    };

    // 1) environment first; nothing config-dependent runs before this
    let env_opts = BootstrapOptions {
        env_file: args
            .env_file
            .clone()
            .unwrap_or_else(|| project_dir.join(".env")),
        required: args.env_file.is_some(),
        strategy: if args.env_override {
            MergeStrategy::Override
        } else {
            MergeStrategy::FillMissing
        },
        export: true,
    };
    let env = bootstrap::init(&env_opts)
        .with_context(|| format!("failed to load env file {}", env_opts.env_file.display()))?;

    // 2) descriptor
    let path = match &args.config {
        Some(p) => p.clone(),
        None => ConfigLoader::locate(&project_dir)?,
    };
    let cfg = ConfigLoader::load(path.as_path())
        .with_context(|| format!("failed to load deployment config {}", path.display()))?;

    let mut out = report::render(&cfg, args.report).context("failed to render report")?;

    if args.files {
        let manifest = Manifest::collect(&cfg, &project_dir)
            .with_context(|| format!("failed to collect files under {}", project_dir.display()))?;
        out.push_str(&report::render_manifest(&manifest));
    }

    if args.dump_env {
        out.push('\n');
        out.push_str(&env.debug_dump(args.effective_redact()));
    }

    print!("{out}");
    Ok(())
}
