use anyhow::{Context, Result, bail};
use glob::Pattern;
use log::debug;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use crate::http::{DEFAULT_ATTEMPTS, HttpClient, StatusPolicy};
use crate::maven::{DEFAULT_EXTENSION, DEFAULT_REPOSITORY, RESERVED_GROUP};

/// Directory the package manager installs into.
pub const MODULES_DIR: &str = "node_modules";
/// Destination of relocated Jolie modules.
pub const PACKAGES_DIR: &str = "packages";
/// Shared directory for downloaded and relocated jars.
pub const LIB_DIR: &str = "lib";
/// Build output directory inside a relocated package.
pub const BUILD_DIR: &str = "target";
/// Files that mark a package as a Jolie module.
pub const SCRIPT_PATTERN: &str = "*.ol";
/// Default number of concurrent downloads or copies.
pub const DEFAULT_JOBS: usize = 8;

const USER_AGENT: &str = concat!("jolie-postinstall/", env!("JOLIE_POSTINSTALL_VERSION"));

/// Settings coming from the command line.
#[derive(Debug, Clone)]
pub struct ConfigOptions {
    pub root: PathBuf,
    pub repository: Option<String>,
    pub jobs: usize,
    pub strict: bool,
    pub attempts: usize,
    pub timeout: Option<Duration>,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            repository: None,
            jobs: DEFAULT_JOBS,
            strict: false,
            attempts: DEFAULT_ATTEMPTS,
            timeout: None,
        }
    }
}

pub struct Config {
    /// Project root holding `node_modules`, `packages` and `lib`.
    pub root: PathBuf,
    pub repository: String,
    pub reserved_group: String,
    pub script_pattern: Pattern,
    pub build_dir: String,
    pub artifact_extension: String,
    pub jobs: usize,
    pub status_policy: StatusPolicy,
    pub http_client: HttpClient,
}

impl Config {
    pub fn new(options: ConfigOptions) -> Result<Self> {
        if options.jobs == 0 {
            bail!("--jobs must be at least 1");
        }
        if options.attempts == 0 {
            bail!("--attempts must be at least 1");
        }

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = options.timeout {
            debug!("Using request timeout of {:?}", timeout);
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        let repository = options
            .repository
            .unwrap_or_else(|| DEFAULT_REPOSITORY.to_string());

        Ok(Self {
            root: options.root,
            repository,
            reserved_group: RESERVED_GROUP.to_string(),
            script_pattern: Pattern::new(SCRIPT_PATTERN)?,
            build_dir: BUILD_DIR.to_string(),
            artifact_extension: DEFAULT_EXTENSION.to_string(),
            jobs: options.jobs,
            status_policy: if options.strict {
                StatusPolicy::Strict
            } else {
                StatusPolicy::Lenient
            },
            http_client: HttpClient::new(client).with_attempts(options.attempts),
        })
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.root.join(MODULES_DIR)
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.root.join(PACKAGES_DIR)
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join(LIB_DIR)
    }

    /// Pattern for compiled artifacts, e.g. `*.jar`.
    pub fn artifact_pattern(&self) -> Result<Pattern> {
        let pattern = format!("*.{}", self.artifact_extension);
        Pattern::new(&pattern).with_context(|| format!("Invalid artifact pattern {}", pattern))
    }
}
