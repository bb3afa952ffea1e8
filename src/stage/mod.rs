//! The post-install stages and the pipeline that sequences them.
//!
//! - `dependencies` - Download runtime jars declared in `pom.xml` manifests
//! - `modules` - Copy Jolie modules out of `node_modules` into `packages`
//! - `services` - Move built jars from `packages/*/target` into `lib`
//! - `pipeline` - Run the selected stages in order

mod dependencies;
mod modules;
mod pipeline;
mod services;

use anyhow::{Context, Result};

pub use dependencies::{DependencySummary, run_dependencies};
pub use modules::{ModuleSummary, run_modules};
pub use pipeline::{PipelineSummary, StageSelection, run, run_with_config};
pub use services::{ServiceSummary, run_services};

/// Run blocking filesystem work on tokio's blocking pool.
async fn blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .context("Filesystem task did not complete")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blocking_returns_work_result() {
        assert_eq!(blocking(|| Ok(42)).await.unwrap(), 42);

        let err = blocking(|| -> Result<()> { Err(anyhow::anyhow!("disk full")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }

    #[tokio::test]
    async fn test_blocking_reports_panics() {
        let err = blocking(|| -> Result<()> { panic!("boom") })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("did not complete"));
    }
}
