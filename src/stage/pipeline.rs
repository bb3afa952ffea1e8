use anyhow::Result;
use log::debug;
use std::sync::Arc;

use super::{
    DependencySummary, ModuleSummary, ServiceSummary, run_dependencies, run_modules, run_services,
};
use crate::config::Config;
use crate::download::{ArtifactFetcher, MavenFetcher};
use crate::report::{Reporter, Stage};
use crate::runtime::Runtime;

/// Which stages a run executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StageSelection {
    #[default]
    All,
    Only(Stage),
}

impl StageSelection {
    pub fn includes(&self, stage: Stage) -> bool {
        match self {
            StageSelection::All => true,
            StageSelection::Only(only) => *only == stage,
        }
    }

    /// The final stage this selection runs.
    pub fn last(&self) -> Stage {
        match self {
            StageSelection::All => Stage::Services,
            StageSelection::Only(only) => *only,
        }
    }
}

/// Outcome of each stage that ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub dependencies: Option<DependencySummary>,
    pub modules: Option<ModuleSummary>,
    pub services: Option<ServiceSummary>,
}

/// Run the selected stages in order: dependencies, modules, services.
///
/// Each stage finishes before the next starts. A dependency stage failure
/// aborts the run.
#[tracing::instrument(skip_all, fields(selection = ?selection))]
pub async fn run<R: Runtime + 'static, F: ArtifactFetcher>(
    runtime: Arc<R>,
    config: &Config,
    fetcher: &F,
    reporter: Arc<dyn Reporter>,
    selection: StageSelection,
) -> Result<PipelineSummary> {
    let mut summary = PipelineSummary::default();

    if selection.includes(Stage::Dependencies) {
        summary.dependencies =
            Some(run_dependencies(&*runtime, config, fetcher, &*reporter).await?);
    }

    if selection.includes(Stage::Modules) {
        summary.modules = Some(run_modules(Arc::clone(&runtime), config, &*reporter).await?);
    }

    if selection.includes(Stage::Services) {
        summary.services = Some(run_services(runtime, config, reporter).await?);
    }

    debug!("Pipeline finished: {:?}", summary);
    Ok(summary)
}

/// Run the pipeline with a [`MavenFetcher`] built from `config`.
pub async fn run_with_config<R: Runtime + 'static>(
    runtime: Arc<R>,
    config: &Config,
    reporter: Arc<dyn Reporter>,
    selection: StageSelection,
) -> Result<PipelineSummary> {
    let fetcher = MavenFetcher::new(
        &*runtime,
        &config.http_client,
        &config.repository,
        &config.artifact_extension,
        config.status_policy,
    );
    run(Arc::clone(&runtime), config, &fetcher, reporter, selection).await
}
