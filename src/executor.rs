//! Pass-through execution of input lines in the OS shell.
//!
//! A line that is not a built-in is handed whole to `<shell> -c <line>`, so
//! pipes, globs and redirections behave as the operator expects. This trusts
//! the operator's input completely: nothing is escaped or sandboxed. The line
//! travels as its own argv element and is never spliced into a quoted string.

use crate::theme::ThemeRegistry;
use anyhow::Result;
use std::io::Write;
use std::process::{Command, ExitStatus, Output};
use tracing::{debug, info, warn};

/// Trait for running system processes.
///
/// This abstraction enables testing without spawning real processes.
pub trait ProcessRunner: Send + Sync {
    /// Executes a command to completion and returns its captured output.
    ///
    /// # Arguments
    ///
    /// * `program` - Program to launch, looked up in PATH
    /// * `args` - Arguments passed to the program as-is
    ///
    /// # Returns
    ///
    /// The exit status together with everything written to stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be launched. A non-zero exit
    /// status is not an error.
    fn run(&self, program: &str, args: &[&str]) -> Result<Output>;

    /// Checks if a program exists in PATH.
    fn program_exists(&self, program: &str) -> bool;
}

/// Default process runner using std::process::Command.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd.output()?)
    }

    fn program_exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Runs pass-through lines through a shell interpreter.
///
/// # Example
///
/// ```ignore
/// let executor = Executor::new("bash");
/// executor.execute_passthrough("ls -la | head", &themes, &mut std::io::stdout()).await?;
/// ```
pub struct Executor {
    shell: String,
    runner: Box<dyn ProcessRunner>,
}

impl Executor {
    /// Uses `preferred` when it is on PATH, otherwise plain `sh`.
    pub fn new(preferred: &str) -> Self {
        Self::with_runner(preferred, Box::new(SystemProcessRunner))
    }

    /// Creates an executor with an injected runner (for testing).
    pub fn with_runner(preferred: &str, runner: Box<dyn ProcessRunner>) -> Self {
        let shell = if runner.program_exists(preferred) {
            preferred.to_string()
        } else {
            warn!("Shell '{}' not found in PATH, falling back to sh", preferred);
            "sh".to_string()
        };
        Self { shell, runner }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Executes `line` and copies its output to `out`: stdout verbatim,
    /// stderr colorized red.
    ///
    /// # Arguments
    ///
    /// * `line` - Raw input line, handed to the shell with `-c`
    /// * `themes` - Registry used to colorize stderr and error messages
    /// * `out` - Writer the command's output is copied to
    ///
    /// # Returns
    ///
    /// The exit status, or `None` for a blank line or a shell that could not
    /// be launched. A launch failure is reported on `out`.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing to `out` fails.
    pub async fn execute_passthrough<W: Write>(
        &self,
        line: &str,
        themes: &ThemeRegistry,
        out: &mut W,
    ) -> Result<Option<ExitStatus>> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        info!("Executing via {}: {}", self.shell, line);

        match self.runner.run(&self.shell, &["-c", line]) {
            Ok(output) => {
                Self::handle_output(&output, themes, out)?;
                if !output.status.success() {
                    debug!("Command exited with status: {}", output.status);
                }
                Ok(Some(output.status))
            }
            Err(e) => {
                warn!("Failed to launch {}: {}", self.shell, e);
                writeln!(out, "{}", themes.colorize(&format!("Error executing command: {}", e), "red"))?;
                Ok(None)
            }
        }
    }

    /// Copies captured output to `out`. The exit status is not inspected.
    fn handle_output<W: Write>(output: &Output, themes: &ThemeRegistry, out: &mut W) -> Result<()> {
        if !output.stdout.is_empty() {
            write!(out, "{}", String::from_utf8_lossy(&output.stdout))?;
        }
        if !output.stderr.is_empty() {
            write!(out, "{}", themes.colorize(&String::from_utf8_lossy(&output.stderr), "red"))?;
        }
        out.flush()?;
        Ok(())
    }
}
