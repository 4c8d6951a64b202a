//! Embeds the root `VERSION` into the binary, derives the HTTP user agent
//! from it, and keeps it in step with the workspace package version.

use std::env;
use std::fs;
use std::path::Path;

fn is_release_version(raw: &str) -> bool {
    let parts: Vec<&str> = raw.split('.').collect();
    parts.len() == 3 && parts.iter().all(|part| part.parse::<u32>().is_ok())
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR");
    let workspace_root = Path::new(&manifest_dir)
        .ancestors()
        .nth(2)
        .expect("platewatch-app lives at crates/platewatch-app");
    let version_path = workspace_root.join("VERSION");
    println!("cargo:rerun-if-changed={}", version_path.display());

    let version = fs::read_to_string(&version_path)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", version_path.display()));
    let version = version.trim();
    assert!(
        is_release_version(version),
        "VERSION must be MAJOR.MINOR.PATCH, found {version:?}"
    );

    let package_version = env::var("CARGO_PKG_VERSION").expect("cargo sets CARGO_PKG_VERSION");
    assert_eq!(
        version, package_version,
        "VERSION and [workspace.package] version disagree"
    );

    println!("cargo:rustc-env=PLATEWATCH_VERSION={version}");
    println!("cargo:rustc-env=PLATEWATCH_USER_AGENT=platewatch/{version}");
}
