use anyhow::{Context, Result};
use futures_util::{StreamExt, stream};
use glob::Pattern;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::blocking;
use crate::config::Config;
use crate::package::{has_matching_file, list_package_dirs};
use crate::report::{Reporter, Stage};
use crate::runtime::Runtime;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSummary {
    pub relocated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Copy every installed package that contains a Jolie script at its top
/// level into `packages/<name>/`.
///
/// Each package is copied on the blocking pool, at most `config.jobs` at a
/// time. Copy failures are logged and counted; they never fail the stage.
#[tracing::instrument(skip_all)]
pub async fn run_modules<R: Runtime + 'static>(
    runtime: Arc<R>,
    config: &Config,
    reporter: &dyn Reporter,
) -> Result<ModuleSummary> {
    reporter.report(Stage::Modules, "Moving Jolie modules...");

    let package_dirs = {
        let runtime = Arc::clone(&runtime);
        let modules_dir = config.modules_dir();
        blocking(move || list_package_dirs(&*runtime, &modules_dir)).await?
    };
    let packages_dir = config.packages_dir();

    let outcomes: Vec<(PathBuf, Result<bool>)> = stream::iter(package_dirs)
        .map(|package_dir| {
            let runtime = Arc::clone(&runtime);
            let pattern = config.script_pattern.clone();
            let packages_dir = packages_dir.clone();
            let source = package_dir.clone();
            async move {
                let outcome = blocking(move || {
                    relocate_module(&*runtime, &pattern, &source, &packages_dir)
                })
                .await;
                (package_dir, outcome)
            }
        })
        .buffer_unordered(config.jobs)
        .collect()
        .await;

    let mut summary = ModuleSummary::default();
    for (package_dir, outcome) in outcomes {
        match outcome {
            Ok(true) => summary.relocated += 1,
            Ok(false) => summary.skipped += 1,
            Err(e) => {
                warn!("Failed to relocate {:?}: {:#}", package_dir, e);
                summary.failed += 1;
            }
        }
    }
    info!(
        "Relocated {} Jolie modules ({} skipped, {} failed)",
        summary.relocated, summary.skipped, summary.failed
    );

    reporter.succeed(Stage::Modules, "Jolie modules moved!");
    Ok(summary)
}

/// Returns `Ok(false)` when the package holds no Jolie script.
fn relocate_module<R: Runtime>(
    runtime: &R,
    script_pattern: &Pattern,
    package_dir: &Path,
    packages_dir: &Path,
) -> Result<bool> {
    if !has_matching_file(runtime, package_dir, script_pattern)? {
        debug!("{:?} has no Jolie scripts, skipping", package_dir);
        return Ok(false);
    }

    let name = package_dir
        .file_name()
        .with_context(|| format!("Package path {:?} has no name", package_dir))?;
    let dest = packages_dir.join(name);

    let copied = runtime
        .copy_dir_all(package_dir, &dest)
        .with_context(|| format!("Failed to copy {:?} to {:?}", package_dir, dest))?;
    debug!("Copied {} files from {:?} to {:?}", copied, package_dir, dest);

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOptions;
    use crate::report::LogReporter;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn config(root: &Path) -> Config {
        Config::new(ConfigOptions {
            root: root.to_path_buf(),
            ..ConfigOptions::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_modules_copies_whole_package() {
        let dir = tempdir().unwrap();
        let svc = dir.path().join("node_modules/file-service");
        fs::create_dir_all(svc.join("lib")).unwrap();
        fs::write(svc.join("main.ol"), "service Main {}").unwrap();
        fs::write(svc.join("package.json"), "{}").unwrap();
        fs::write(svc.join("lib/helper.jar"), "jar").unwrap();

        let summary = run_modules(Arc::new(RealRuntime), &config(dir.path()), &LogReporter)
            .await
            .unwrap();

        assert_eq!(summary.relocated, 1);
        let dest = dir.path().join("packages/file-service");
        assert!(dest.join("main.ol").is_file());
        assert!(dest.join("package.json").is_file());
        assert!(dest.join("lib/helper.jar").is_file());
    }

    #[tokio::test]
    async fn test_run_modules_skips_packages_without_scripts() {
        let dir = tempdir().unwrap();
        let lodash = dir.path().join("node_modules/lodash");
        fs::create_dir_all(lodash.join("fp")).unwrap();
        fs::write(lodash.join("index.js"), "module.exports = {}").unwrap();
        // nested scripts do not count
        fs::write(lodash.join("fp/nested.ol"), "").unwrap();

        let summary = run_modules(Arc::new(RealRuntime), &config(dir.path()), &LogReporter)
            .await
            .unwrap();

        assert_eq!(
            summary,
            ModuleSummary {
                relocated: 0,
                skipped: 1,
                failed: 0
            }
        );
        assert!(!dir.path().join("packages/lodash").exists());
    }

    #[tokio::test]
    async fn test_run_modules_overwrites_previous_copy() {
        let dir = tempdir().unwrap();
        let svc = dir.path().join("node_modules/svc");
        fs::create_dir_all(&svc).unwrap();
        fs::write(svc.join("main.ol"), "v2").unwrap();

        let dest = dir.path().join("packages/svc");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("main.ol"), "v1").unwrap();

        run_modules(Arc::new(RealRuntime), &config(dir.path()), &LogReporter)
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(dest.join("main.ol")).unwrap(), "v2");
    }

    #[tokio::test]
    async fn test_run_modules_logs_copy_failures() {
        let mut runtime = MockRuntime::new();
        let modules = PathBuf::from("/app/node_modules");

        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_dir()
            .with(eq(modules.clone()))
            .returning(|p| Ok(vec![p.join("bad"), p.join("good")]));
        runtime.expect_is_dir().returning(|_| true);
        runtime
            .expect_read_dir()
            .withf(|p| p.parent() == Some(Path::new("/app/node_modules")))
            .returning(|p| Ok(vec![p.join("main.ol")]));
        runtime.expect_is_file().returning(|_| true);
        runtime
            .expect_copy_dir_all()
            .with(eq(modules.join("bad")), eq(PathBuf::from("/app/packages/bad")))
            .returning(|_, _| Err(anyhow::anyhow!("disk full")));
        runtime
            .expect_copy_dir_all()
            .with(eq(modules.join("good")), eq(PathBuf::from("/app/packages/good")))
            .times(1)
            .returning(|_, _| Ok(1));

        let runtime = Arc::new(runtime);
        let summary = run_modules(Arc::clone(&runtime), &config(Path::new("/app")), &LogReporter)
            .await
            .unwrap();

        assert_eq!(
            summary,
            ModuleSummary {
                relocated: 1,
                skipped: 0,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_run_modules_without_node_modules() {
        let dir = tempdir().unwrap();
        let summary = run_modules(Arc::new(RealRuntime), &config(dir.path()), &LogReporter)
            .await
            .unwrap();
        assert_eq!(summary, ModuleSummary::default());
    }

    #[tokio::test]
    async fn test_run_modules_keeps_runtime_responsive() {
        let dir = tempdir().unwrap();
        let payload = vec![b'x'; 1 << 20];
        for i in 0..16 {
            let pkg = dir.path().join(format!("node_modules/svc-{i}"));
            fs::create_dir_all(&pkg).unwrap();
            fs::write(pkg.join("main.ol"), "service Main {}").unwrap();
            fs::write(pkg.join("bundle.bin"), &payload).unwrap();
        }

        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let ticker = tokio::spawn(async move {
            loop {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
            }
        });

        let summary = run_modules(Arc::new(RealRuntime), &config(dir.path()), &LogReporter)
            .await
            .unwrap();
        ticker.abort();

        assert_eq!(summary.relocated, 16);
        // other tasks ran on this single-threaded runtime while packages were copied
        assert!(ticks.load(Ordering::SeqCst) > 0);
    }
}
