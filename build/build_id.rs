//! Build identification shared by the mma binaries
//!
//! Emits `BUILD_ID` for the startup banner, e.g.
//! `v0.1.0 [1a2b3c4d-dirty] built 2024-06-01T12:00:00Z (release)`.
//! No `rerun-if-changed` directives are printed, so the id is refreshed on
//! every build.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn main() {
    let revision = match git(&["rev-parse", "--short=8", "HEAD"]) {
        Some(hash) => {
            let dirty = git(&["status", "--porcelain"]).is_some_and(|s| !s.is_empty());
            if dirty {
                format!("{}-dirty", hash)
            } else {
                hash
            }
        }
        None => "unknown".to_string(),
    };

    let built = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();

    println!(
        "cargo:rustc-env=BUILD_ID=v{} [{}] built {} ({})",
        version, revision, built, profile
    );
}
