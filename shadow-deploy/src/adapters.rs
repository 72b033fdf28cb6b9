//! Stage trait implementations over the real backend client and toolchains.

use shadow_client::{BackendClient, RegistrationError, RegistrationOutcome, UploadError, UploadOutcome};
use shadow_core::{Address, Identity, StorageKind};
use shadow_discovery::FileSet;
use shadow_toolchain::{AnchorDeployer, CommandRunner, MintError, SplTokenMinter, ToolchainError};

use crate::stages::{
    ContentUploader, DomainRegistrar, MintTarget, ProgramDeployer, ProgramTarget, TokenMinter,
};

impl ContentUploader for BackendClient {
    fn upload(&self, files: &FileSet, storage: StorageKind) -> Result<UploadOutcome, UploadError> {
        BackendClient::upload(self, files, storage)
    }
}

impl DomainRegistrar for BackendClient {
    fn register(
        &self,
        domain: &str,
        program: &Address,
        identity: &Identity,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        self.register_alias(domain, program, identity)
    }
}

impl<R: CommandRunner> ProgramDeployer for AnchorDeployer<R> {
    fn deploy(&self, target: &ProgramTarget<'_>) -> Result<Address, ToolchainError> {
        AnchorDeployer::deploy(
            self,
            target.program_dir,
            target.network,
            target.keypair,
            target.program_name,
        )
    }
}

impl<R: CommandRunner> TokenMinter for SplTokenMinter<R> {
    fn mint(&self, target: &MintTarget<'_>) -> Result<Address, MintError> {
        self.mint_ownership_token(target.keypair, target.owner, target.workdir)
    }
}
