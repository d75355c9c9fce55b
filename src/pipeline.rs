//! Installation pipeline: resolve, build parameters, apply stages in order.
//!
//! There is no persisted state and no resume. A failed stage stops the walk
//! and leaves earlier stages applied; because apply is create-or-update,
//! calling [`install`] again after fixing the cause re-applies them harmlessly.
use crate::apply::{Applier, Manifest, TargetHandle};
use crate::assets;
use crate::config::SystemConfig;
use crate::error::{InstallError, InstallResult};
use crate::lvmd::{resolve_lvmd_config, LvmdResolution};
use crate::params::{build_lvmd_params, params_from_config, RenderParams};
use crate::render::render_template;
use crate::stages::{ManifestStage, RenderInputs, LVMS_STAGES};
use std::path::Path;
use std::time::Instant;

/// Parameter sets computed once per install and shared by every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInputs {
    component: RenderParams,
    system: RenderParams,
    system_with_component: RenderParams,
}

impl StageInputs {
    pub fn new(system: &SystemConfig, component: RenderParams) -> Self {
        Self {
            system: params_from_config(system, None),
            system_with_component: params_from_config(system, Some(&component)),
            component,
        }
    }

    fn params_for(&self, render: RenderInputs) -> Option<&RenderParams> {
        match render {
            RenderInputs::None => None,
            RenderInputs::Component => Some(&self.component),
            RenderInputs::System => Some(&self.system),
            RenderInputs::SystemWithComponent => Some(&self.system_with_component),
        }
    }
}

/// Outcome of a completed install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub lvmd: LvmdResolution,
    pub stages: Vec<&'static str>,
    pub manifests: usize,
}

/// Stages and manifests applied by [`run_stages`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSummary {
    pub stages: Vec<&'static str>,
    pub manifests: usize,
}

/// Install the TopoLVM plugin into `target`.
///
/// `config_dir` is the directory of the global config file; the lvmd override
/// is looked up there.
pub fn install(
    system: &SystemConfig,
    config_dir: &Path,
    applier: &mut dyn Applier,
    target: &TargetHandle,
) -> InstallResult<InstallReport> {
    let lvmd = resolve_lvmd_config(config_dir)?;
    tracing::info!(source = %lvmd.source_label(), "resolved lvmd config");
    let component = build_lvmd_params(lvmd.config())?;
    let inputs = StageInputs::new(system, component);

    let summary = run_stages(LVMS_STAGES, &inputs, applier, target)?;
    Ok(InstallReport {
        lvmd,
        stages: summary.stages,
        manifests: summary.manifests,
    })
}

/// Apply `stages` in order, stopping at the first failure.
pub fn run_stages(
    stages: &[ManifestStage],
    inputs: &StageInputs,
    applier: &mut dyn Applier,
    target: &TargetHandle,
) -> InstallResult<StageSummary> {
    let mut summary = StageSummary::default();
    for stage in stages {
        let start = Instant::now();
        tracing::debug!(stage = stage.name, kind = %stage.kind, "applying stage");
        if let Err(err) = run_stage(stage, inputs, applier, target) {
            tracing::warn!(
                stage = stage.name,
                manifests = ?stage.manifests,
                error = %err,
                "failed to apply stage"
            );
            return Err(InstallError::Stage {
                stage: stage.name,
                manifests: stage.manifests.iter().map(|id| id.to_string()).collect(),
                source: Box::new(err),
            });
        }
        tracing::info!(
            stage = stage.name,
            manifests = stage.manifests.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "stage applied"
        );
        summary.stages.push(stage.name);
        summary.manifests += stage.manifests.len();
    }
    Ok(summary)
}

/// Load a stage's manifests and render them if the stage is templated.
pub fn render_stage(stage: &ManifestStage, inputs: &StageInputs) -> InstallResult<Vec<Manifest>> {
    let params = inputs.params_for(stage.render);
    stage
        .manifests
        .iter()
        .map(|id| -> InstallResult<Manifest> {
            let template = assets::manifest_body(id)?;
            let body = match params {
                Some(params) => render_template(id, template, params)?,
                None => template.to_string(),
            };
            Ok(Manifest { id: *id, body })
        })
        .collect()
}

fn run_stage(
    stage: &ManifestStage,
    inputs: &StageInputs,
    applier: &mut dyn Applier,
    target: &TargetHandle,
) -> InstallResult<()> {
    let manifests = render_stage(stage, inputs)?;
    applier.apply(stage.kind, &manifests, target)?;
    Ok(())
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
