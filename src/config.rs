use crate::policy::ToolPolicy;
use anyhow::{Context, Result};
use clap::Args;
use tracing_subscriber::EnvFilter;

/// Options shared by every subcommand. Each can also come from the
/// environment.
#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Log filter (tracing EnvFilter syntax); logs go to stderr
    #[arg(long = "log", env = "HWP_OPS_LOG", default_value = "warn", global = true)]
    pub log: String,
    /// Only expose these operations (comma separated)
    #[arg(long, env = "HWP_OPS_ENABLE", value_delimiter = ',', global = true)]
    pub enable: Option<Vec<String>>,
    /// Hide and refuse these operations (comma separated)
    #[arg(long, env = "HWP_OPS_DISABLE", value_delimiter = ',', global = true)]
    pub disable: Vec<String>,
}

impl GlobalArgs {
    pub fn policy(&self) -> ToolPolicy {
        if self.enable.is_none() && self.disable.is_empty() {
            return ToolPolicy::allow_all();
        }
        ToolPolicy::new(self.enable.clone(), self.disable.clone())
    }
}

/// Stdout carries protocol messages, so logs are written to stderr.
pub fn init_logging(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter)
        .with_context(|| format!("invalid log filter: {filter}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))
}
