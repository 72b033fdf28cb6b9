//! spl-token mint adapter driven by a scripted runner.

mod support;

use std::path::Path;

use shadow_core::Address;
use shadow_toolchain::{MintError, MintStep, SplTokenMinter};
use support::{FakeRunner, Reply};

const MINT: &str = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS";
const CREATED: &str = "Creating token Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS\n\nSignature: 4ZT";

fn owner() -> Address {
    Address::from_bytes(&[5; 32])
}

fn mint_with(runner: &FakeRunner) -> Result<Address, MintError> {
    SplTokenMinter::new(runner, "spl-token", "https://api.devnet.solana.com").mint_ownership_token(
        Path::new("/proj/.shadow/id.json"),
        &owner(),
        Path::new("/proj"),
    )
}

#[test]
fn three_steps_in_order() {
    let runner = FakeRunner::new([Reply::Ok(CREATED), Reply::Ok("Creating account"), Reply::Ok("Minting 1 tokens")]);
    let mint = mint_with(&runner).expect("mint");
    assert_eq!(mint.as_str(), MINT);

    assert_eq!(runner.call_count(), 3);
    let create = runner.args(0);
    assert_eq!(&create[..3], ["create-token", "--decimals", "0"]);
    assert!(create.contains(&owner().to_string()));
    assert_eq!(&runner.args(1)[..2], ["create-account", MINT]);
    assert_eq!(&runner.args(2)[..3], ["mint", MINT, "1"]);
    for i in 0..3 {
        let args = runner.args(i);
        let url = args.iter().position(|a| a == "--url").expect("--url");
        assert_eq!(args[url + 1], "https://api.devnet.solana.com");
        assert!(args.contains(&"--fee-payer".to_string()));
    }
}

#[test]
fn failure_names_the_step() {
    let runner = FakeRunner::new([Reply::Ok(CREATED), Reply::Fail(1, "Error: insufficient funds")]);
    let err = mint_with(&runner).unwrap_err();
    assert_eq!(err.step(), Some(MintStep::CreateAccount));
    assert!(err.to_string().contains("create-account"), "got: {err}");
    assert_eq!(runner.call_count(), 2);
}

#[test]
fn unparseable_create_output_stops() {
    let runner = FakeRunner::new([Reply::Ok("something unexpected")]);
    let err = mint_with(&runner).unwrap_err();
    assert!(matches!(err, MintError::AddressExtraction));
    assert_eq!(runner.call_count(), 1);
}

#[test]
fn missing_cli() {
    let runner = FakeRunner::new([Reply::Missing]);
    assert!(matches!(mint_with(&runner).unwrap_err(), MintError::ToolchainMissing { .. }));
}
