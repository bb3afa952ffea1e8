use anyhow::{Context, Result};
use futures_util::{StreamExt, stream};
use glob::Pattern;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::blocking;
use crate::config::Config;
use crate::package::{list_package_dirs, matching_files};
use crate::report::{Reporter, Stage};
use crate::runtime::Runtime;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceSummary {
    /// Packages whose build output was moved and removed.
    pub moved: usize,
    pub jars: usize,
    pub failed: usize,
}

/// Move compiled jars out of every `packages/<name>/target/` into the shared
/// library directory, then delete `target/`.
///
/// A failure stops the affected package (its `target/` is kept) and is
/// logged; other packages are unaffected and the stage still succeeds.
#[tracing::instrument(skip_all)]
pub async fn run_services<R: Runtime + 'static>(
    runtime: Arc<R>,
    config: &Config,
    reporter: Arc<dyn Reporter>,
) -> Result<ServiceSummary> {
    reporter.report(Stage::Services, "Moving Java services to lib...");

    let pattern = config.artifact_pattern()?;
    let lib_dir = config.lib_dir();
    let package_dirs = {
        let runtime = Arc::clone(&runtime);
        let packages_dir = config.packages_dir();
        blocking(move || list_package_dirs(&*runtime, &packages_dir)).await?
    };

    let outcomes: Vec<(PathBuf, Result<Option<usize>>)> = stream::iter(package_dirs)
        .map(|package_dir| {
            let runtime = Arc::clone(&runtime);
            let reporter = Arc::clone(&reporter);
            let target = package_dir.join(&config.build_dir);
            let lib_dir = lib_dir.clone();
            let pattern = pattern.clone();
            async move {
                let outcome = blocking(move || {
                    relocate_service(&*runtime, &*reporter, &target, &lib_dir, &pattern)
                })
                .await;
                (package_dir, outcome)
            }
        })
        .buffer_unordered(config.jobs)
        .collect()
        .await;

    let mut summary = ServiceSummary::default();
    for (package_dir, outcome) in outcomes {
        match outcome {
            Ok(Some(jars)) => {
                summary.moved += 1;
                summary.jars += jars;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Failed to move services of {:?}: {:#}", package_dir, e);
                summary.failed += 1;
            }
        }
    }
    info!(
        "Moved {} jars from {} packages ({} failed)",
        summary.jars, summary.moved, summary.failed
    );

    reporter.succeed(Stage::Services, "Java services moved to lib!");
    Ok(summary)
}

/// Returns `Ok(None)` when there is no build output at `target`.
fn relocate_service<R: Runtime>(
    runtime: &R,
    reporter: &dyn Reporter,
    target: &Path,
    lib_dir: &Path,
    pattern: &Pattern,
) -> Result<Option<usize>> {
    if !runtime.is_dir(target) {
        debug!("{:?} does not exist, skipping", target);
        return Ok(None);
    }

    let jars = matching_files(runtime, target, pattern)?;
    if !jars.is_empty() {
        runtime.create_dir_all(lib_dir)?;
    }

    for jar in &jars {
        let name = jar
            .file_name()
            .with_context(|| format!("Artifact path {:?} has no name", jar))?;
        reporter.report(
            Stage::Services,
            &format!("Moving {} to lib...", name.to_string_lossy()),
        );
        runtime.copy(jar, &lib_dir.join(name))?;
    }

    runtime.remove_dir_all(target)?;
    debug!("Removed {:?}", target);

    Ok(Some(jars.len()))
}
