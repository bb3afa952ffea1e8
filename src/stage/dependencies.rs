use anyhow::Result;
use futures_util::{StreamExt, TryStreamExt, stream};
use log::{debug, info};

use crate::config::Config;
use crate::download::ArtifactFetcher;
use crate::maven::{MANIFEST_FILE, read_manifest};
use crate::package::list_package_dirs;
use crate::report::{Reporter, Stage};
use crate::runtime::Runtime;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySummary {
    /// Installed packages that carry a manifest.
    pub manifests: usize,
    /// Artifacts downloaded, duplicates included.
    pub artifacts: usize,
    pub bytes: u64,
}

/// Download every retained manifest dependency of every installed package
/// into the shared library directory.
///
/// Manifests are all read before any download starts, so an unparsable
/// manifest fails the stage without side effects. Downloads then run with at
/// most `config.jobs` in flight; the first failure aborts the stage and drops
/// the remaining downloads.
#[tracing::instrument(skip_all)]
pub async fn run_dependencies<R: Runtime, F: ArtifactFetcher>(
    runtime: &R,
    config: &Config,
    fetcher: &F,
    reporter: &dyn Reporter,
) -> Result<DependencySummary> {
    reporter.report(Stage::Dependencies, "Downloading Maven dependencies...");

    let mut summary = DependencySummary::default();
    let mut dependencies = Vec::new();

    for package_dir in list_package_dirs(runtime, &config.modules_dir())? {
        let manifest = package_dir.join(MANIFEST_FILE);
        if !runtime.is_file(&manifest) {
            continue;
        }
        summary.manifests += 1;

        let retained = read_manifest(runtime, &manifest, &config.reserved_group)?;
        debug!(
            "{:?}: {} dependencies to download",
            package_dir,
            retained.len()
        );
        dependencies.extend(retained);
    }

    if dependencies.is_empty() {
        info!("No Maven dependencies to download");
        reporter.succeed(Stage::Dependencies, "Maven dependencies downloaded!");
        return Ok(summary);
    }

    let lib_dir = config.lib_dir();
    runtime.create_dir_all(&lib_dir)?;

    let sizes: Vec<u64> = stream::iter(dependencies.iter())
        .map(|dependency| fetcher.fetch(dependency, &lib_dir))
        .buffer_unordered(config.jobs)
        .try_collect()
        .await?;

    summary.artifacts = sizes.len();
    summary.bytes = sizes.iter().sum();
    info!(
        "Downloaded {} artifacts ({} bytes) from {} manifests",
        summary.artifacts, summary.bytes, summary.manifests
    );

    reporter.succeed(Stage::Dependencies, "Maven dependencies downloaded!");
    Ok(summary)
}
