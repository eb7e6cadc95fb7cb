use clap::Parser;
use edgecfg::report::ReportMode;

#[derive(Parser, Debug)]
#[command(name = "edgecfg", version, about)]
pub struct Args {
    /// Path to the deployment descriptor (default: edgecfg.toml / edgecfg.json in the project dir)
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Project directory used for descriptor lookup, the env file and the manifest
    #[arg(long)]
    pub project_dir: Option<std::path::PathBuf>,

    /// Dotenv file loaded before the config (default: <project-dir>/.env, optional)
    #[arg(long)]
    pub env_file: Option<std::path::PathBuf>,

    /// Let env file values replace variables already set in the environment
    #[arg(long, default_value_t = false)]
    pub env_override: bool,

    #[arg(long, value_enum, default_value_t = ReportMode::Summary)]
    pub report: ReportMode,

    /// Also list the files the config selects
    #[arg(long, default_value_t = false)]
    pub files: bool,

    /// Dump the bootstrapped environment
    #[arg(long, default_value_t = false)]
    pub dump_env: bool,

    /// Redact secret-like values in the environment dump (default on)
    #[arg(long, default_value_t = true)]
    pub redact: bool,

    /// Disable redaction in the environment dump
    #[arg(long = "no-redact", default_value_t = false)]
    pub no_redact: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    pub fn effective_redact(&self) -> bool {
        if self.no_redact { false } else { self.redact }
    }
}
