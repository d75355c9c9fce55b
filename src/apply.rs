//! The apply capability and the transports shipped with the installer.
//!
//! The pipeline only ever talks to [`Applier`]; which transport sits behind it
//! is decided by the CLI. Apply is expected to be idempotent (create or
//! update), which is what makes re-running a failed install safe.
use crate::error::ApplyError;
use crate::stages::ResourceKind;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

/// A manifest ready to apply: its identifier plus the (rendered) body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub id: &'static str,
    pub body: String,
}

impl Manifest {
    /// File name component of the identifier.
    pub fn file_name(&self) -> &str {
        Path::new(self.id)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.id)
    }
}

/// Opaque description of the cluster to apply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetHandle {
    kubeconfig: PathBuf,
}

impl TargetHandle {
    pub fn new(kubeconfig: PathBuf) -> Self {
        Self { kubeconfig }
    }

    pub fn kubeconfig(&self) -> &Path {
        &self.kubeconfig
    }
}

/// Apply a group of manifests of one kind to a target.
pub trait Applier {
    fn apply(
        &mut self,
        kind: ResourceKind,
        manifests: &[Manifest],
        target: &TargetHandle,
    ) -> Result<(), ApplyError>;
}

/// Applies manifests by piping them to `kubectl apply -f -`.
#[derive(Debug, Clone)]
pub struct KubectlApplier {
    program: PathBuf,
    args: Vec<String>,
}

impl KubectlApplier {
    /// Build an applier from a command line such as `kubectl` or
    /// `microshift kubectl`. Bare program names are resolved through `PATH`.
    pub fn new(command: &str) -> Result<Self> {
        let mut words = shell_words::split(command)
            .with_context(|| format!("parse kubectl command: {command}"))?;
        if words.is_empty() {
            return Err(anyhow!("kubectl command is empty"));
        }
        let program = words.remove(0);
        let program = if program.contains(std::path::MAIN_SEPARATOR) {
            PathBuf::from(program)
        } else {
            which::which(&program).with_context(|| format!("locate {program} in PATH"))?
        };
        Ok(Self {
            program,
            args: words,
        })
    }

    fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

impl Applier for KubectlApplier {
    fn apply(
        &mut self,
        kind: ResourceKind,
        manifests: &[Manifest],
        target: &TargetHandle,
    ) -> Result<(), ApplyError> {
        let command = self.display();
        let bundle = join_documents(manifests);
        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("--kubeconfig")
            .arg(target.kubeconfig())
            .args(["apply", "-f", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ApplyError::Io {
                command: command.clone(),
                source,
            })?;

        // A child that exits early closes the pipe; its status explains why.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(bundle.as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output().map_err(|source| ApplyError::Io {
            command: command.clone(),
            source,
        })?;
        let elapsed_ms = start.elapsed().as_millis();

        tracing::info!(
            %kind,
            elapsed_ms,
            manifests = manifests.len(),
            bundle_bytes = bundle.len(),
            "kubectl apply complete"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr
                .trim()
                .lines()
                .next()
                .map(str::to_string)
                .unwrap_or_else(|| "no output".to_string());
            return Err(ApplyError::Command {
                command,
                status: output.status.to_string(),
                detail,
            });
        }
        written.map_err(|source| ApplyError::Io { command, source })
    }
}

/// Join manifests into one multi-document YAML stream.
pub fn join_documents(manifests: &[Manifest]) -> String {
    let mut out = String::new();
    for manifest in manifests {
        out.push_str("---\n");
        out.push_str(&format!("# Source: {}\n", manifest.id));
        out.push_str(&manifest.body);
        if !manifest.body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Writes manifests under `<root>/<NN>-<kind>/` instead of applying them.
///
/// Each call gets the next sequence number, so the directory listing mirrors
/// apply order.
#[derive(Debug)]
pub struct DirectoryApplier {
    root: PathBuf,
    next_stage: usize,
    written: Vec<PathBuf>,
}

impl DirectoryApplier {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            next_stage: 0,
            written: Vec::new(),
        }
    }

    /// Files written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Applier for DirectoryApplier {
    fn apply(
        &mut self,
        kind: ResourceKind,
        manifests: &[Manifest],
        _target: &TargetHandle,
    ) -> Result<(), ApplyError> {
        self.next_stage += 1;
        let stage_dir = self.root.join(format!("{:02}-{}", self.next_stage, kind));
        fs::create_dir_all(&stage_dir).map_err(|source| ApplyError::Write {
            path: stage_dir.clone(),
            source,
        })?;
        for manifest in manifests {
            let path = stage_dir.join(manifest.file_name());
            fs::write(&path, manifest.body.as_bytes()).map_err(|source| ApplyError::Write {
                path: path.clone(),
                source,
            })?;
            self.written.push(path);
        }
        tracing::debug!(%kind, dir = %stage_dir.display(), "wrote rendered manifests");
        Ok(())
    }
}
