//! Progress reporting.
//!
//! Stages report coarse status through an injected [`Reporter`]. Nothing here
//! affects correctness; a run behaves the same with any reporter.

use log::info;
use std::fmt;
use std::io::Write;
use std::sync::Mutex;

/// The three post-install stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dependencies,
    Modules,
    Services,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Dependencies => "dependencies",
            Stage::Modules => "modules",
            Stage::Services => "services",
        };
        f.write_str(name)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Reporter: Send + Sync {
    /// Work in progress for `stage`.
    fn report(&self, stage: Stage, message: &str);

    /// A step of `stage` has completed.
    fn succeed(&self, stage: Stage, message: &str);
}

/// Writes one status line per event, `✔`-prefixed on completion.
pub struct ConsoleReporter {
    out: Mutex<Box<dyn Write + Send>>,
    quiet: bool,
}

impl ConsoleReporter {
    /// Reporter on standard error, so stdout stays clean for scripts.
    pub fn stderr(quiet: bool) -> Self {
        Self::with_writer(Box::new(std::io::stderr()), quiet)
    }

    pub fn with_writer(out: Box<dyn Write + Send>, quiet: bool) -> Self {
        Self {
            out: Mutex::new(out),
            quiet,
        }
    }

    fn line(&self, prefix: &str, message: &str) {
        if self.quiet {
            return;
        }
        if let Ok(mut out) = self.out.lock() {
            // a closed stderr is not worth failing the install over
            let _ = writeln!(out, "{} {}", prefix, message);
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, _stage: Stage, message: &str) {
        self.line("-", message);
    }

    fn succeed(&self, _stage: Stage, message: &str) {
        self.line("✔", message);
    }
}

/// Forwards status to the `log` facade.
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, stage: Stage, message: &str) {
        info!("[{}] {}", stage, message);
    }

    fn succeed(&self, stage: Stage, message: &str) {
        info!("[{}] done: {}", stage, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_console_reporter_lines() {
        let captured = Captured::default();
        let reporter = ConsoleReporter::with_writer(Box::new(captured.clone()), false);

        reporter.report(Stage::Dependencies, "Downloading Maven dependencies...");
        reporter.succeed(Stage::Dependencies, "Maven dependencies downloaded!");

        assert_eq!(
            captured.text(),
            "- Downloading Maven dependencies...\n✔ Maven dependencies downloaded!\n"
        );
    }

    #[test]
    fn test_console_reporter_quiet() {
        let captured = Captured::default();
        let reporter = ConsoleReporter::with_writer(Box::new(captured.clone()), true);

        reporter.report(Stage::Modules, "Moving Jolie modules...");
        reporter.succeed(Stage::Modules, "Jolie modules moved!");

        assert!(captured.text().is_empty());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Dependencies.to_string(), "dependencies");
        assert_eq!(Stage::Modules.to_string(), "modules");
        assert_eq!(Stage::Services.to_string(), "services");
    }
}
