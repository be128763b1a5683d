//! Build script for ride-dispatch
//!
//! Embeds git and toolchain details so `ride-dispatch version` can report
//! exactly what was built.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let dirty = match command_output("git", &["status", "--porcelain"]) {
        Some(status) if !status.is_empty() => "true",
        Some(_) => "false",
        None => "unknown",
    };

    let vars = [
        ("RIDE_DISPATCH_GIT_HASH", command_output("git", &["rev-parse", "--short=8", "HEAD"])),
        ("RIDE_DISPATCH_GIT_BRANCH", command_output("git", &["rev-parse", "--abbrev-ref", "HEAD"])),
        ("RIDE_DISPATCH_GIT_DIRTY", Some(dirty.to_string())),
        (
            "RIDE_DISPATCH_BUILD_TIMESTAMP",
            Some(chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        ),
        ("RIDE_DISPATCH_TARGET", env::var("TARGET").ok()),
        ("RIDE_DISPATCH_PROFILE", env::var("PROFILE").ok()),
        ("RIDE_DISPATCH_RUSTC_VERSION", command_output("rustc", &["--version"])),
    ];

    for (name, value) in vars {
        println!(
            "cargo:rustc-env={}={}",
            name,
            value.unwrap_or_else(|| "unknown".to_string())
        );
    }
}

/// Trimmed stdout of a successful command
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}
