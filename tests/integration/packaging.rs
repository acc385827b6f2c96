//! Checks on the crate manifest itself.

use std::path::Path;

fn cargo_manifest() -> toml::Table {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
    std::fs::read_to_string(path).unwrap().parse().unwrap()
}

#[test]
fn test_test_only_crates_stay_out_of_runtime_dependencies() {
    let manifest = cargo_manifest();
    let runtime = manifest["dependencies"].as_table().unwrap();
    let dev = manifest["dev-dependencies"].as_table().unwrap();

    for name in ["tempfile", "assert_cmd", "predicates"] {
        assert!(!runtime.contains_key(name), "{name} belongs in [dev-dependencies]");
        assert!(dev.contains_key(name), "{name} missing from [dev-dependencies]");
    }
}
