use std::fmt;

/// Maven Central, the repository every artifact is fetched from unless overridden.
pub const DEFAULT_REPOSITORY: &str = "https://repo1.maven.org/maven2";

/// Packaging of downloaded and relocated artifacts.
pub const DEFAULT_EXTENSION: &str = "jar";

/// A Maven coordinate taken verbatim from a manifest.
///
/// Fields are opaque: nothing is validated, so a malformed coordinate simply
/// produces a URL that fails at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Dependency {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    /// Repository-relative directory, e.g. `com/foo/bar/baz/1.0`.
    pub fn group_path(&self) -> String {
        format!(
            "{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version
        )
    }

    /// Canonical file name, e.g. `baz-1.0.jar`.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}-{}.{}", self.artifact_id, self.version, extension)
    }

    /// Fully-qualified download URL under `repository`.
    pub fn url(&self, repository: &str, extension: &str) -> String {
        format!(
            "{}/{}/{}",
            repository.trim_end_matches('/'),
            self.group_path(),
            self.file_name(extension)
        )
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}
