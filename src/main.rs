use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod apply;
mod assets;
mod cli;
mod config;
mod error;
mod lvmd;
mod params;
mod pipeline;
mod render;
mod stages;

use crate::apply::{DirectoryApplier, KubectlApplier, TargetHandle};
use crate::cli::{Command, ConfigArgs, InstallArgs, RenderArgs, RootArgs, StagesArgs, KUBECTL_ENV};
use crate::config::SystemConfig;
use crate::stages::LVMS_STAGES;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Install(args) => cmd_install(args),
        Command::Render(args) => cmd_render(args),
        Command::Config(args) => cmd_config(args),
        Command::Stages(args) => cmd_stages(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_install(args: InstallArgs) -> Result<()> {
    let system = SystemConfig::load(&args.config)?;
    let kubeconfig = resolve_kubeconfig(args.kubeconfig)?;
    let command = args
        .kubectl
        .or_else(|| std::env::var(KUBECTL_ENV).ok())
        .unwrap_or_else(|| "kubectl".to_string());
    let mut applier = KubectlApplier::new(&command)?;
    let target = TargetHandle::new(kubeconfig);

    let report = match pipeline::install(&system, config_dir(&args.config), &mut applier, &target)
    {
        Ok(report) => report,
        Err(err) => {
            if let Some(stage) = err.failed_stage() {
                tracing::error!(
                    stage,
                    cause = %err.root(),
                    "install stopped; earlier stages stay applied, re-run after fixing the cause"
                );
            }
            return Err(err).context("install storage plugin");
        }
    };
    println!(
        "applied {} manifests in {} stages (lvmd config: {})",
        report.manifests,
        report.stages.len(),
        report.lvmd.source_label()
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let system = SystemConfig::load(&args.config)?;
    let mut applier = DirectoryApplier::new(args.out.clone());
    let target = TargetHandle::new(args.out.clone());

    pipeline::install(&system, config_dir(&args.config), &mut applier, &target)
        .context("render storage plugin manifests")?;
    for path in applier.written() {
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> Result<()> {
    let resolution = lvmd::resolve_lvmd_config(config_dir(&args.config))?;
    if args.json {
        let value = serde_json::json!({
            "source": if resolution.is_default() { "default" } else { "file" },
            "path": lvmd::lvmd_config_path(&args.config),
            "config": resolution.config(),
        });
        let text = serde_json::to_string_pretty(&value).context("serialize lvmd config")?;
        println!("{text}");
        return Ok(());
    }
    let text = serde_yaml::to_string(resolution.config()).context("serialize lvmd config")?;
    println!("# source: {}", resolution.source_label());
    if let Some(class) = resolution.config().default_device_class() {
        println!(
            "# default device class: {} (volume group {})",
            class.name, class.volume_group
        );
    }
    print!("{text}");
    Ok(())
}

fn cmd_stages(args: StagesArgs) -> Result<()> {
    if args.json {
        let text = serde_json::to_string_pretty(LVMS_STAGES).context("serialize stages")?;
        println!("{text}");
        return Ok(());
    }
    for (idx, stage) in LVMS_STAGES.iter().enumerate() {
        let scope = if stage.kind.is_namespaced() {
            "namespaced"
        } else {
            "cluster"
        };
        println!("{:02} {} ({}, {scope})", idx + 1, stage.name, stage.kind);
        for id in stage.manifests {
            println!("   {id}");
        }
    }
    Ok(())
}

fn config_dir(config_file: &Path) -> &Path {
    config_file.parent().unwrap_or_else(|| Path::new("."))
}

fn resolve_kubeconfig(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os("KUBECONFIG").filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(".kube").join("config"))
        .ok_or_else(|| anyhow!("no kubeconfig given and home directory is unknown"))
}
