//! CLI argument parsing for the storage plugin installer.
//!
//! The CLI only wires inputs to the pipeline; ordering and failure policy
//! live in the pipeline so they can be exercised without a cluster.
use crate::config::DEFAULT_GLOBAL_CONFIG_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable overriding the kubectl command line.
pub const KUBECTL_ENV: &str = "LVMS_KUBECTL";

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "lvms-install",
    version,
    about = "Install the TopoLVM storage plugin manifests",
    after_help = "Examples:\n  lvms-install config\n  lvms-install stages --json\n  lvms-install render --out /tmp/lvms\n  lvms-install install --kubeconfig /var/lib/microshift/resources/kubeadmin/kubeconfig",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Install(InstallArgs),
    Render(RenderArgs),
    Config(ConfigArgs),
    Stages(StagesArgs),
}

/// Apply every stage to a cluster.
#[derive(Parser, Debug)]
#[command(about = "Apply the storage plugin manifests to a cluster")]
pub struct InstallArgs {
    /// Global config file; lvmd.yaml is read from the same directory
    #[arg(long, value_name = "PATH", default_value = DEFAULT_GLOBAL_CONFIG_FILE)]
    pub config: PathBuf,

    /// Kubeconfig for the target cluster (defaults to $KUBECONFIG, then ~/.kube/config)
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Command used to apply manifests (defaults to $LVMS_KUBECTL, then kubectl)
    #[arg(long, value_name = "CMD")]
    pub kubectl: Option<String>,
}

/// Render every stage into a directory instead of applying it.
#[derive(Parser, Debug)]
#[command(about = "Render the manifests into a directory without applying them")]
pub struct RenderArgs {
    /// Global config file; lvmd.yaml is read from the same directory
    #[arg(long, value_name = "PATH", default_value = DEFAULT_GLOBAL_CONFIG_FILE)]
    pub config: PathBuf,

    /// Output directory for rendered manifests
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,
}

/// Show the effective lvmd configuration.
#[derive(Parser, Debug)]
#[command(about = "Print the effective lvmd config and where it came from")]
pub struct ConfigArgs {
    /// Global config file; lvmd.yaml is read from the same directory
    #[arg(long, value_name = "PATH", default_value = DEFAULT_GLOBAL_CONFIG_FILE)]
    pub config: PathBuf,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// List the stage table.
#[derive(Parser, Debug)]
#[command(about = "List the install stages in apply order")]
pub struct StagesArgs {
    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}
