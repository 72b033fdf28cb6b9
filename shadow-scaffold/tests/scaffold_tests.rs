//! Rendering and writing a complete project skeleton.

use std::fs;
use std::path::PathBuf;

use shadow_core::{manifest, Address, ContentId, Manifest, Network, StorageKind};
use shadow_scaffold::{
    write_integration, write_new_project, IntegrationContext, ProjectContext, Scaffold,
    ScaffoldError,
};
use tempfile::TempDir;

#[test]
fn new_project_tree_is_complete() {
    let parent = TempDir::new().expect("tempdir");
    let dir = parent.path().join("demo");
    let ctx = ProjectContext::new("demo", Network::Devnet, StorageKind::Ipfs).unwrap();
    let files = Scaffold::new().unwrap().render_project(&ctx).unwrap();

    write_new_project(&dir, &files).expect("write");

    for rel in [
        "assets/index.html",
        "README.md",
        ".gitignore",
        "programs/Anchor.toml",
        "programs/Cargo.toml",
        "programs/programs/demo/Cargo.toml",
        "programs/programs/demo/src/lib.rs",
    ] {
        assert!(dir.join(rel).is_file(), "{rel} missing");
    }
    let html = fs::read_to_string(dir.join("assets/index.html")).unwrap();
    assert!(html.contains("<title>demo</title>"));
}

#[test]
fn anchor_toml_is_valid_and_lists_program() {
    let ctx = ProjectContext::new("my-site", Network::Mainnet, StorageKind::Ipfs).unwrap();
    let files = Scaffold::new().unwrap().render_project(&ctx).unwrap();
    let (_, anchor) = files
        .iter()
        .find(|(p, _)| p.ends_with("Anchor.toml"))
        .expect("Anchor.toml rendered");

    let doc: toml::Table = anchor.parse().expect("valid TOML");
    assert_eq!(
        doc["programs"]["devnet"]["my_site"].as_str(),
        Some("11111111111111111111111111111111")
    );
    assert_eq!(doc["provider"]["cluster"].as_str(), Some("mainnet"));
}

#[test]
fn cargo_manifests_are_valid_toml() {
    let ctx = ProjectContext::new("site", Network::Devnet, StorageKind::Ipfs).unwrap();
    let files = Scaffold::new().unwrap().render_project(&ctx).unwrap();
    for (path, contents) in files.iter().filter(|(p, _)| p.ends_with("Cargo.toml")) {
        contents
            .parse::<toml::Table>()
            .unwrap_or_else(|e| panic!("{} is not valid TOML: {e}", path.display()));
    }
}

#[test]
fn existing_directory_is_left_alone() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("keep.txt"), "mine").unwrap();
    let files = vec![(PathBuf::from("README.md"), "x".to_string())];
    let err = write_new_project(dir.path(), &files).unwrap_err();
    assert!(matches!(err, ScaffoldError::AlreadyExists { .. }));
    assert!(!dir.path().join("README.md").exists());
}

#[test]
fn integration_file_reflects_manifest() {
    let dir = TempDir::new().expect("tempdir");
    let mut m = Manifest::new("converted", Network::Devnet, StorageKind::Ipfs);
    let program = Address::from_bytes(&[4; 32]);
    let mint = Address::from_bytes(&[6; 32]);
    m.program_address = Some(program.clone());
    m.token_mint = Some(mint.clone());
    m.storage_cid = Some(ContentId::from("bafybeiexample"));
    m.domain = Some(format!("{}.shadow", mint.prefix(8)));
    manifest::save(dir.path(), &m).unwrap();

    let ctx = IntegrationContext::from_manifest(&m).unwrap();
    let js = Scaffold::new().unwrap().render_integration(&ctx).unwrap();
    let path = write_integration(dir.path(), &js).unwrap();

    let written = fs::read_to_string(path).unwrap();
    assert!(written.contains(&format!("programAddress: \"{program}\"")));
    assert!(written.contains(&format!("tokenMint: \"{mint}\"")));
    assert!(written.contains("storageCid: \"bafybeiexample\""));
    assert!(written.contains(&format!("domain: \"{}.shadow\"", mint.prefix(8))));
}
