//! In-memory stage implementations for the orchestrator tests.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;

use shadow_client::{
    ClientError, Coverage, RegistrationError, RegistrationOutcome, UploadError, UploadOutcome,
};
use shadow_core::{Address, ContentId, Identity, StorageKind};
use shadow_deploy::{
    ContentUploader, DomainRegistrar, MintTarget, ProgramDeployer, ProgramTarget, Stages,
    TokenMinter,
};
use shadow_discovery::FileSet;
use shadow_toolchain::{MintError, MintStep, ToolchainError};

pub const PROGRAM: &str = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS";
pub const MINT: &str = "HmbTLCmaGvZhKnn1Zfa1JVnp7vkMV4DYVxPLWBVoN65L";

pub fn address(s: &str) -> Address {
    s.parse().unwrap()
}

/// Three eligible site files plus noise the deploy rules exclude.
pub fn write_site(dir: &Path) {
    fs::create_dir_all(dir.join("assets")).unwrap();
    fs::write(dir.join("assets/index.html"), "<h1>hi</h1>").unwrap();
    fs::write(dir.join("assets/style.css"), "h1 { color: red }").unwrap();
    fs::write(dir.join("assets/app.js"), "console.log(1)").unwrap();
    fs::create_dir_all(dir.join("node_modules/pkg")).unwrap();
    fs::write(dir.join("node_modules/pkg/index.js"), "module.exports = 1").unwrap();
    fs::write(dir.join("deploy.log"), "old log").unwrap();
}

// ---------------------------------------------------------------------------
// Uploader
// ---------------------------------------------------------------------------

pub struct FakeUploader {
    pub calls: Cell<usize>,
    pub file_counts: RefCell<Vec<usize>>,
    status: Option<u16>,
    coverage: Coverage,
}

impl FakeUploader {
    pub fn ok() -> Self {
        Self::with(None, Coverage::Full)
    }

    pub fn failing(status: u16) -> Self {
        Self::with(Some(status), Coverage::Full)
    }

    pub fn partial(published: &str, omitted: usize) -> Self {
        Self::with(
            None,
            Coverage::Partial {
                published: published.to_string(),
                omitted,
            },
        )
    }

    fn with(status: Option<u16>, coverage: Coverage) -> Self {
        Self {
            calls: Cell::new(0),
            file_counts: RefCell::default(),
            status,
            coverage,
        }
    }
}

impl ContentUploader for FakeUploader {
    fn upload(&self, files: &FileSet, storage: StorageKind) -> Result<UploadOutcome, UploadError> {
        self.calls.set(self.calls.get() + 1);
        self.file_counts.borrow_mut().push(files.len());
        if let Some(status) = self.status {
            return Err(UploadError {
                backend: storage,
                file_count: files.len(),
                cause: ClientError::Status {
                    method: "POST".into(),
                    url: "http://backend/api/upload/ipfs/directory".into(),
                    status,
                    body: "internal error".into(),
                },
            });
        }
        Ok(UploadOutcome {
            content_id: ContentId::from(format!("bafy-{}", &files.digest()[..12])),
            coverage: self.coverage.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Program deployer
// ---------------------------------------------------------------------------

pub struct FakeDeployer {
    pub calls: Cell<usize>,
    fail: bool,
}

impl FakeDeployer {
    pub fn ok() -> Self {
        Self {
            calls: Cell::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Cell::new(0),
            fail: true,
        }
    }
}

impl ProgramDeployer for FakeDeployer {
    fn deploy(&self, target: &ProgramTarget<'_>) -> Result<Address, ToolchainError> {
        self.calls.set(self.calls.get() + 1);
        assert!(target.keypair.ends_with(".shadow/id.json"));
        if self.fail {
            return Err(ToolchainError::DeploymentFailed {
                step: "anchor deploy".into(),
                status: "exit 1".into(),
                stderr: "Error: Account has insufficient funds".into(),
            });
        }
        Ok(address(PROGRAM))
    }
}

// ---------------------------------------------------------------------------
// Minter
// ---------------------------------------------------------------------------

pub struct FakeMinter {
    pub calls: Cell<usize>,
    fail: bool,
}

impl FakeMinter {
    pub fn ok() -> Self {
        Self {
            calls: Cell::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Cell::new(0),
            fail: true,
        }
    }
}

impl TokenMinter for FakeMinter {
    fn mint(&self, _target: &MintTarget<'_>) -> Result<Address, MintError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(MintError::StepFailed {
                step: MintStep::CreateToken,
                status: "exit 1".into(),
                stderr: "Error: insufficient funds for fee".into(),
            });
        }
        Ok(address(MINT))
    }
}

// ---------------------------------------------------------------------------
// Registrar
// ---------------------------------------------------------------------------

pub struct FakeRegistrar {
    pub domains: RefCell<Vec<String>>,
    conflict_owner: Option<String>,
}

impl FakeRegistrar {
    pub fn ok() -> Self {
        Self {
            domains: RefCell::default(),
            conflict_owner: None,
        }
    }

    pub fn owned_by(owner: &str) -> Self {
        Self {
            domains: RefCell::default(),
            conflict_owner: Some(owner.to_string()),
        }
    }

    pub fn calls(&self) -> usize {
        self.domains.borrow().len()
    }
}

impl DomainRegistrar for FakeRegistrar {
    fn register(
        &self,
        domain: &str,
        _program: &Address,
        _identity: &Identity,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        self.domains.borrow_mut().push(domain.to_string());
        match &self.conflict_owner {
            Some(owner) => Err(RegistrationError::Conflict {
                domain: domain.to_string(),
                owner: owner.clone(),
            }),
            None => Ok(RegistrationOutcome::Registered),
        }
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

pub struct Fakes {
    pub uploader: FakeUploader,
    pub deployer: FakeDeployer,
    pub minter: FakeMinter,
    pub registrar: FakeRegistrar,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            uploader: FakeUploader::ok(),
            deployer: FakeDeployer::ok(),
            minter: FakeMinter::ok(),
            registrar: FakeRegistrar::ok(),
        }
    }
}

impl Fakes {
    pub fn stages(&self) -> Stages<'_> {
        Stages {
            uploader: &self.uploader,
            deployer: &self.deployer,
            minter: &self.minter,
            registrar: &self.registrar,
        }
    }
}
