use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use std::path::Path;

use crate::http::{HttpClient, StatusPolicy};
use crate::maven::Dependency;
use crate::runtime::Runtime;

/// Fetches one artifact into a destination directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Download `dependency` into `dest_dir`, overwriting any file with the
    /// same name. Returns the number of bytes written.
    async fn fetch(&self, dependency: &Dependency, dest_dir: &Path) -> Result<u64>;
}

/// Downloads artifacts from a Maven-layout repository.
pub struct MavenFetcher<'a, R: Runtime> {
    runtime: &'a R,
    http_client: &'a HttpClient,
    repository: &'a str,
    extension: &'a str,
    policy: StatusPolicy,
}

impl<'a, R: Runtime> MavenFetcher<'a, R> {
    pub fn new(
        runtime: &'a R,
        http_client: &'a HttpClient,
        repository: &'a str,
        extension: &'a str,
        policy: StatusPolicy,
    ) -> Self {
        Self {
            runtime,
            http_client,
            repository,
            extension,
            policy,
        }
    }
}

#[async_trait]
impl<R: Runtime> ArtifactFetcher for MavenFetcher<'_, R> {
    #[tracing::instrument(skip(self, dependency), fields(dependency = %dependency))]
    async fn fetch(&self, dependency: &Dependency, dest_dir: &Path) -> Result<u64> {
        let url = dependency.url(self.repository, self.extension);
        let dest = dest_dir.join(dependency.file_name(self.extension));
        info!("Downloading {} to {:?}", url, dest);

        let bytes = self
            .http_client
            .download_file(&url, self.policy, || self.runtime.create_file(&dest))
            .await
            .with_context(|| format!("Failed to download {} from {}", dependency, url))?;

        info!("Saved {:?} ({} bytes)", dest, bytes);
        Ok(bytes)
    }
}
