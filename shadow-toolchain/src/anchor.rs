//! Program build + deploy through the Anchor CLI.

use std::path::Path;

use shadow_core::{Address, Network};

use crate::error::{io_err, ToolchainError};
use crate::output::extract_program_address;
use crate::runner::{CommandRunner, RunError, SystemRunner};

const INSTALL_HINT: &str = "install the Anchor CLI (https://www.anchor-lang.com/docs/installation)";

/// Lines of stderr kept in a `DeploymentFailed` message.
const STDERR_TAIL: usize = 20;

#[derive(Debug, Clone)]
pub struct AnchorDeployer<R = SystemRunner> {
    runner: R,
    command: String,
}

impl AnchorDeployer<SystemRunner> {
    pub fn system(command: impl Into<String>) -> Self {
        Self::new(SystemRunner, command)
    }
}

impl<R: CommandRunner> AnchorDeployer<R> {
    pub fn new(runner: R, command: impl Into<String>) -> Self {
        Self {
            runner,
            command: command.into(),
        }
    }

    /// Build and deploy the workspace in `program_dir`, paying with the
    /// keypair file at `wallet`, and return the deployed program address.
    pub fn deploy(
        &self,
        program_dir: &Path,
        network: Network,
        wallet: &Path,
        program_name: &str,
    ) -> Result<Address, ToolchainError> {
        let anchor_toml = program_dir.join("Anchor.toml");
        if !anchor_toml.is_file() {
            return Err(ToolchainError::NoProgramWorkspace {
                path: program_dir.to_path_buf(),
            });
        }

        self.step(program_dir, "build", &["build".to_string()])?;
        let deploy = self.step(
            program_dir,
            "deploy",
            &[
                "deploy".to_string(),
                "--provider.cluster".to_string(),
                network.cluster().to_string(),
                "--provider.wallet".to_string(),
                wallet.display().to_string(),
            ],
        )?;

        let manifest =
            std::fs::read_to_string(&anchor_toml).map_err(|e| io_err(&anchor_toml, e))?;
        let address = extract_program_address(
            &deploy.combined(),
            Some(&manifest),
            network.cluster(),
            program_name,
        )?;
        tracing::info!("deployed program {address} to {network}");
        Ok(address)
    }

    fn step(
        &self,
        program_dir: &Path,
        name: &str,
        args: &[String],
    ) -> Result<crate::runner::CommandOutput, ToolchainError> {
        let output = self
            .runner
            .run(&self.command, args, program_dir)
            .map_err(|e| match e {
                RunError::NotFound { program } => ToolchainError::ToolchainMissing {
                    tool: program,
                    hint: INSTALL_HINT,
                },
                RunError::Io { source, .. } => io_err(program_dir, source),
            })?;
        if !output.success {
            return Err(ToolchainError::DeploymentFailed {
                step: format!("{} {name}", self.command),
                status: output.status_label(),
                stderr: output.tail(STDERR_TAIL),
            });
        }
        Ok(output)
    }
}
