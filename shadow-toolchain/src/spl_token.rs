//! Ownership token minting through the `spl-token` CLI.
//!
//! Three invocations: `create-token --decimals 0`, `create-account <mint>`,
//! `mint <mint> 1`. The identity keypair pays fees and holds every authority.

use std::path::Path;

use shadow_core::Address;

use crate::error::{MintError, MintStep};
use crate::output::extract_mint_address;
use crate::runner::{CommandOutput, CommandRunner, RunError, SystemRunner};

#[derive(Debug, Clone)]
pub struct SplTokenMinter<R = SystemRunner> {
    runner: R,
    command: String,
    rpc_url: String,
}

impl SplTokenMinter<SystemRunner> {
    pub fn system(command: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self::new(SystemRunner, command, rpc_url)
    }
}

impl<R: CommandRunner> SplTokenMinter<R> {
    pub fn new(runner: R, command: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            runner,
            command: command.into(),
            rpc_url: rpc_url.into(),
        }
    }

    /// Create a zero-decimal token owned by `owner` and mint exactly one unit
    /// into its account. Returns the mint address.
    pub fn mint_ownership_token(
        &self,
        wallet: &Path,
        owner: &Address,
        workdir: &Path,
    ) -> Result<Address, MintError> {
        let created = self.step(
            workdir,
            wallet,
            MintStep::CreateToken,
            &[
                "create-token",
                "--decimals",
                "0",
                "--mint-authority",
                owner.as_str(),
            ],
        )?;
        let mint = extract_mint_address(&created.stdout).ok_or(MintError::AddressExtraction)?;

        self.step(
            workdir,
            wallet,
            MintStep::CreateAccount,
            &["create-account", mint.as_str()],
        )?;
        self.step(workdir, wallet, MintStep::Mint, &["mint", mint.as_str(), "1"])?;

        tracing::info!("minted ownership token {mint}");
        Ok(mint)
    }

    fn step(
        &self,
        workdir: &Path,
        wallet: &Path,
        step: MintStep,
        args: &[&str],
    ) -> Result<CommandOutput, MintError> {
        let wallet = wallet.display().to_string();
        let mut full: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        full.extend([
            "--url".to_string(),
            self.rpc_url.clone(),
            "--fee-payer".to_string(),
            wallet.clone(),
            "--owner".to_string(),
            wallet,
        ]);

        let output = self
            .runner
            .run(&self.command, &full, workdir)
            .map_err(|e| match e {
                RunError::NotFound { program } => MintError::ToolchainMissing { tool: program },
                RunError::Io { source, .. } => MintError::Spawn { step, source },
            })?;
        if !output.success {
            return Err(MintError::StepFailed {
                step,
                status: output.status_label(),
                stderr: output.tail(5),
            });
        }
        Ok(output)
    }
}
