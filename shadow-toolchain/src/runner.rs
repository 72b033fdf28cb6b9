//! Subprocess execution behind a trait so adapters can be driven by a fake.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code; `None` when killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// `exit 1`, `signal` etc. for error messages.
    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit {code}"),
            None => "terminated by signal".to_string(),
        }
    }

    /// stdout followed by stderr, for pattern scanning.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// The last `lines` non-empty lines of stderr (stdout if stderr is empty).
    pub fn tail(&self, lines: usize) -> String {
        let src = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        let kept: Vec<&str> = src.lines().filter(|l| !l.trim().is_empty()).collect();
        kept[kept.len().saturating_sub(lines)..].join("\n")
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    /// The executable could not be found.
    #[error("'{program}' not found")]
    NotFound { program: String },

    #[error("failed to run '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait CommandRunner {
    /// Run `program args..` in `cwd` to completion. A non-zero exit is not an
    /// error at this level.
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, RunError>;
}

/// Runs real processes with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, RunError> {
        tracing::debug!("running {program} {} in {}", args.join(" "), cwd.display());
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => RunError::NotFound {
                    program: program.to_string(),
                },
                _ => RunError::Io {
                    program: program.to_string(),
                    source: e,
                },
            })?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, RunError> {
        (**self).run(program, args, cwd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_prefers_stderr() {
        let out = CommandOutput {
            success: false,
            code: Some(1),
            stdout: "ok\n".into(),
            stderr: "a\n\nb\nc\n".into(),
        };
        assert_eq!(out.tail(2), "b\nc");
        assert_eq!(out.status_label(), "exit 1");
    }

    #[test]
    fn missing_binary_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = SystemRunner
            .run("shadow-definitely-not-installed", &[], dir.path())
            .unwrap_err();
        assert!(matches!(err, RunError::NotFound { .. }));
    }
}
