//! Manifest persistence tests: round-trips, error messages, atomic writes.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;
use shadow_core::{
    manifest, Address, ContentId, Manifest, ManifestError, Network, StorageKind,
};

fn addr(byte: u8) -> Address {
    Address::from_bytes(&[byte; 32])
}

fn fresh() -> Manifest {
    Manifest::new("my-site", Network::Devnet, StorageKind::Ipfs)
}

fn uploaded() -> Manifest {
    let mut m = Manifest::new("my-site", Network::Mainnet, StorageKind::Arweave);
    m.owner = Some(addr(1));
    m.storage_cid = Some(ContentId::from("Yk1lR8v0Hc3pQ9m2sLxZrT4uWbN6aEfGiJkMoPqRsTu"));
    m.content_digest = Some("0f".repeat(32));
    m
}

fn complete() -> Manifest {
    let mut m = uploaded();
    m.program_address = Some(addr(2));
    m.token_mint = Some(addr(3));
    m.domain = Some("my-site.shadow".to_string());
    m
}

fn converted_unicode() -> Manifest {
    let mut m = Manifest::new("サイト-сайт", Network::Devnet, StorageKind::Ipfs);
    m.converted = true;
    m.program_path = std::path::PathBuf::from("chain/programs");
    m
}

#[rstest]
#[case::fresh(fresh())]
#[case::uploaded(uploaded())]
#[case::complete(complete())]
#[case::converted_unicode(converted_unicode())]
fn save_then_load_is_identity(#[case] m: Manifest) {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    manifest::save(dir.path(), &m).expect("save");
    let loaded = manifest::load(dir.path()).expect("load");
    assert_eq!(loaded, m);
}

#[test]
fn saved_manifest_is_pretty_json() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    manifest::save(dir.path(), &complete()).expect("save");
    dir.child("shadow.json")
        .assert(predicate::str::contains("\"programAddress\""))
        .assert(predicate::str::contains("\n  \"name\": \"my-site\""));
}

#[test]
fn overwrite_replaces_previous_checkpoint() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    manifest::save(dir.path(), &uploaded()).expect("first save");
    manifest::save(dir.path(), &complete()).expect("second save");
    let loaded = manifest::load(dir.path()).expect("load");
    assert_eq!(loaded.token_mint, Some(addr(3)));
    dir.child("shadow.json.tmp").assert(predicate::path::missing());
}

#[test]
fn missing_manifest_message_names_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = manifest::load(dir.path()).unwrap_err();
    assert!(matches!(err, ManifestError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("shadow.json"));
}

#[test]
fn invalid_address_in_manifest_is_parse_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("shadow.json")
        .write_str(r#"{"name":"x","programAddress":"not-an-address"}"#)
        .expect("write");
    let err = manifest::load(dir.path()).unwrap_err();
    assert!(matches!(err, ManifestError::Parse { .. }), "got: {err}");
}

#[test]
#[cfg(unix)]
fn save_into_readonly_dir_fails_without_partial_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = assert_fs::TempDir::new().expect("tempdir");
    manifest::save(dir.path(), &uploaded()).expect("save");

    let mut perms = std::fs::metadata(dir.path()).unwrap().permissions();
    perms.set_mode(0o555);
    std::fs::set_permissions(dir.path(), perms).unwrap();

    let result = manifest::save(dir.path(), &complete());

    let mut perms = std::fs::metadata(dir.path()).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(dir.path(), perms).unwrap();

    // Running as root ignores directory permissions; only assert when the write failed.
    if result.is_err() {
        let loaded = manifest::load(dir.path()).expect("previous checkpoint intact");
        assert_eq!(loaded, uploaded());
    }
}
