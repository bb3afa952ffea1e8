use anyhow::Result;
use clap::Parser;
use jolie_postinstall::config::{Config, ConfigOptions, DEFAULT_JOBS};
use jolie_postinstall::http::DEFAULT_ATTEMPTS;
use jolie_postinstall::report::{ConsoleReporter, Reporter, Stage};
use jolie_postinstall::stage::{StageSelection, run_with_config};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// jolie-postinstall - post-install step for Jolie packages
///
/// Downloads the Maven dependencies declared by installed packages, copies
/// Jolie modules into ./packages and moves built services into ./lib.
///
/// Examples:
///   jolie-postinstall            # Run every stage in the current directory
///   jolie-postinstall deps -j 4  # Only download Maven dependencies
#[derive(Parser, Debug)]
#[command(author, version = env!("JOLIE_POSTINSTALL_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project root containing node_modules (also via JOLIE_POSTINSTALL_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "JOLIE_POSTINSTALL_ROOT",
        value_name = "PATH",
        default_value = ".",
        global = true
    )]
    pub root: PathBuf,

    /// Maven repository URL (defaults to https://repo1.maven.org/maven2)
    #[arg(
        long = "repository",
        env = "JOLIE_POSTINSTALL_REPOSITORY",
        value_name = "URL",
        global = true
    )]
    pub repository: Option<String>,

    /// Maximum concurrent downloads or copies
    #[arg(long, short = 'j', value_name = "N", default_value_t = DEFAULT_JOBS, global = true)]
    pub jobs: usize,

    /// Fail on non-success HTTP responses instead of saving the body
    #[arg(long, global = true)]
    pub strict: bool,

    /// Attempts per download; transient failures are retried
    #[arg(long, value_name = "N", default_value_t = DEFAULT_ATTEMPTS, global = true)]
    pub attempts: usize,

    /// Per-request timeout in seconds (no timeout by default)
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(clap::Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Run every stage (default)
    All,
    /// Download Maven dependencies into lib
    Deps,
    /// Copy Jolie modules into packages
    Modules,
    /// Move built services from packages/*/target into lib
    Services,
}

impl From<Commands> for StageSelection {
    fn from(command: Commands) -> Self {
        match command {
            Commands::All => StageSelection::All,
            Commands::Deps => StageSelection::Only(Stage::Dependencies),
            Commands::Modules => StageSelection::Only(Stage::Modules),
            Commands::Services => StageSelection::Only(Stage::Services),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = Arc::new(jolie_postinstall::runtime::RealRuntime);

    let config = Config::new(ConfigOptions {
        root: cli.root,
        repository: cli.repository,
        jobs: cli.jobs,
        strict: cli.strict,
        attempts: cli.attempts,
        timeout: cli.timeout.map(Duration::from_secs),
    })?;
    let reporter = Arc::new(ConsoleReporter::stderr(cli.quiet));
    let selection = cli.command.map(StageSelection::from).unwrap_or_default();

    run_with_config(runtime, &config, reporter.clone(), selection).await?;

    reporter.succeed(selection.last(), "Done!");
    Ok(())
}
