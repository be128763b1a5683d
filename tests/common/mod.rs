//! Common test utilities and fixtures
//!
//! Every command runs inside a scratch directory with HOME pointed at it, so
//! a config file on the developer machine never leaks into a test.

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Get an identity snapshot fixture, e.g. `identity_fixture("driver")`
pub fn identity_fixture(kind: &str) -> PathBuf {
    fixture_path(&format!("identity_{}.json", kind))
}

/// Isolated environment for running the binary
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// A `ride-dispatch` command with no config search hits
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("ride-dispatch").unwrap();
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join(".config"))
            .env_remove("RIDE_DISPATCH_CONFIG")
            .env_remove("RUST_LOG");
        for var in [
            "RIDE_DISPATCH_DRIVER_ROUTE",
            "RIDE_DISPATCH_VERIFY_ROUTE",
            "RIDE_DISPATCH_HOME_ROUTE",
            "RIDE_DISPATCH_WELCOME_ROUTE",
            "RIDE_DISPATCH_HISTORY_LIMIT",
            "RIDE_DISPATCH_LOG_LEVEL",
            "RIDE_DISPATCH_LOG_FILE",
            "RIDE_DISPATCH_LOG_JSON",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Write a config file into the sandbox and return its path
    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write an identity snapshot into the sandbox and return its path
    pub fn write_identity(&self, content: &str) -> PathBuf {
        let path = self.dir.path().join("identity.json");
        std::fs::write(&path, content).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_config_fixtures_exist() {
        assert!(valid_config_fixture().exists());
        assert!(invalid_config_fixture().exists());
    }

    #[test]
    fn test_identity_fixtures_exist() {
        for kind in ["driver", "rider", "not_loaded", "malformed"] {
            assert!(identity_fixture(kind).exists(), "missing identity_{}.json", kind);
        }
    }
}
