//! `pom.xml` reader.
//!
//! Only `<project><dependencies><dependency>` is read. Property placeholders,
//! parent inheritance and `dependencyManagement` are left to Maven itself.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::path::Path;

use super::Dependency;
use crate::runtime::Runtime;

/// Manifest file looked up at the top of every installed package.
pub const MANIFEST_FILE: &str = "pom.xml";

/// Group of the Jolie runtime itself; its artifacts ship with the interpreter.
pub const RESERVED_GROUP: &str = "org.jolie-lang";

#[derive(Debug, Deserialize)]
struct Project {
    #[serde(default)]
    dependencies: Option<DependencyList>,
}

#[derive(Debug, Default, Deserialize)]
struct DependencyList {
    #[serde(default, rename = "dependency")]
    entries: Vec<ManifestEntry>,
}

/// One `<dependency>` element as written in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub scope: Option<String>,
}

impl ManifestEntry {
    /// Runtime dependencies outside the reserved group are kept; anything
    /// scoped `test` or `compile` is expected to be present already.
    pub fn is_retained(&self, reserved_group: &str) -> bool {
        let scope = self.scope.as_deref().map(str::trim);
        self.group_id.as_deref().map(str::trim) != Some(reserved_group)
            && scope != Some("test")
            && scope != Some("compile")
    }

    fn into_dependency(self) -> Option<Dependency> {
        Some(Dependency::new(
            self.group_id?.trim(),
            self.artifact_id?.trim(),
            self.version?.trim(),
        ))
    }
}

/// Parse manifest XML and return the dependencies that need downloading.
pub fn parse_manifest(xml: &str, reserved_group: &str) -> Result<Vec<Dependency>> {
    let project: Project = quick_xml::de::from_str(xml).context("Failed to parse manifest XML")?;

    let entries = project.dependencies.unwrap_or_default().entries;
    debug!("Manifest declares {} dependencies", entries.len());

    let mut retained = Vec::new();
    for entry in entries {
        if !entry.is_retained(reserved_group) {
            debug!("Skipping {:?}", entry);
            continue;
        }
        match entry.clone().into_dependency() {
            Some(dependency) => retained.push(dependency),
            None => warn!("Skipping incomplete dependency entry {:?}", entry),
        }
    }

    Ok(retained)
}

/// Read and parse the manifest at `path`.
#[tracing::instrument(skip(runtime))]
pub fn read_manifest<R: Runtime>(
    runtime: &R,
    path: &Path,
    reserved_group: &str,
) -> Result<Vec<Dependency>> {
    let xml = runtime.read_to_string(path)?;
    parse_manifest(&xml, reserved_group).with_context(|| format!("Invalid manifest {:?}", path))
}
