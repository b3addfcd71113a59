//! Build script for lingua-api
//!
//! Captures build identification information at compile time:
//! - Git commit hash (short form)
//! - Build timestamp
//! - Build profile (debug/release)

use std::process::Command;

fn main() {
    let git_hash = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    // ISO 8601 with local offset, e.g. 2026-10-14T14:30:45-05:00
    let build_timestamp = chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false);

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);

    // No rerun-if-changed directives: Cargo reruns the script on every build,
    // so the timestamp and git hash stay current
}
