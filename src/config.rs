//! Configuration system for ride-dispatch
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (RIDE_DISPATCH_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dispatcher::{DispatchTargets, POST_RIDE_SCREEN, VERIFY_DRIVER_SCREEN};
use crate::error::{Error, Result};
use crate::navigator::RouterNavigator;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Route identifiers agreed with the routing layer
    pub routes: RouteSettings,

    /// In-process router settings
    pub navigator: NavigatorSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Route identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    /// Target for verified drivers
    pub driver: String,

    /// Target for everyone else (driver verification)
    pub verify_driver: String,

    /// Startup target for signed-in users
    pub signed_in_home: String,

    /// Startup target for signed-out users
    pub welcome: String,
}

/// Router settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorSettings {
    /// Routes the router accepts.
    /// Unset = the four configured routes, empty list = any route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_routes: Option<Vec<String>>,

    /// Number of history entries kept
    pub history_limit: usize,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            driver: POST_RIDE_SCREEN.to_string(),
            verify_driver: VERIFY_DRIVER_SCREEN.to_string(),
            signed_in_home: "/(root)/(tabs)/home".to_string(),
            welcome: "/(auth)/welcome".to_string(),
        }
    }
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            known_routes: None,
            history_limit: 32,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl RouteSettings {
    fn all(&self) -> [&str; 4] {
        [
            self.driver.as_str(),
            self.verify_driver.as_str(),
            self.signed_in_home.as_str(),
            self.welcome.as_str(),
        ]
    }
}

impl DispatchConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|source| Error::IoRead {
                path: path.clone(),
                source,
            })?;
            config = toml::from_str(&content).map_err(Error::config_parse)?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            return if path.exists() {
                Ok(Some(path))
            } else {
                Err(Error::config_not_found(path))
            };
        }

        let search_paths = [
            PathBuf::from("ride-dispatch.toml"),
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .map(|p| p.join("ride-dispatch").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".ride-dispatch").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/ride-dispatch/config.toml"),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Routes
        if let Ok(val) = std::env::var("RIDE_DISPATCH_DRIVER_ROUTE") {
            self.routes.driver = val;
        }
        if let Ok(val) = std::env::var("RIDE_DISPATCH_VERIFY_ROUTE") {
            self.routes.verify_driver = val;
        }
        if let Ok(val) = std::env::var("RIDE_DISPATCH_HOME_ROUTE") {
            self.routes.signed_in_home = val;
        }
        if let Ok(val) = std::env::var("RIDE_DISPATCH_WELCOME_ROUTE") {
            self.routes.welcome = val;
        }

        // Navigator
        if let Ok(val) = std::env::var("RIDE_DISPATCH_HISTORY_LIMIT") {
            if let Ok(n) = val.parse() {
                self.navigator.history_limit = n;
            }
        }

        // Logging
        if let Ok(val) = std::env::var("RIDE_DISPATCH_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("RIDE_DISPATCH_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("RIDE_DISPATCH_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let named = [
            ("routes.driver", &self.routes.driver),
            ("routes.verify_driver", &self.routes.verify_driver),
            ("routes.signed_in_home", &self.routes.signed_in_home),
            ("routes.welcome", &self.routes.welcome),
        ];
        for (field, value) in named {
            if value.trim().is_empty() {
                return Err(Error::config_field_invalid(field, format!("{} cannot be empty", field)));
            }
        }

        if self.routes.driver == self.routes.verify_driver {
            return Err(Error::config_field_invalid(
                "routes.verify_driver",
                "driver and verify_driver routes must differ",
            ));
        }

        if self.navigator.history_limit == 0 {
            return Err(Error::config_field_invalid(
                "navigator.history_limit",
                "history_limit must be greater than 0",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// An explicit route list that misses a dispatch target is allowed,
    /// but every dispatch to that target will fail.
    pub fn warn_unroutable_targets(&self) {
        let navigator = self.build_navigator();
        for target in [&self.routes.driver, &self.routes.verify_driver] {
            if !navigator.accepts(target) {
                warn!(route = %target, "Dispatch target is not in navigator.known_routes");
            }
        }
    }

    /// Targets used by the dispatcher
    pub fn dispatch_targets(&self) -> DispatchTargets {
        DispatchTargets {
            driver: self.routes.driver.clone(),
            verify_driver: self.routes.verify_driver.clone(),
        }
    }

    /// Build the router described by `[navigator]`
    pub fn build_navigator(&self) -> RouterNavigator {
        let limit = self.navigator.history_limit;
        match &self.navigator.known_routes {
            None => RouterNavigator::new(self.routes.all(), limit),
            Some(routes) if routes.is_empty() => RouterNavigator::permissive(limit),
            Some(routes) => RouterNavigator::new(routes.iter().cloned(), limit),
        }
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".ride-dispatch")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::IoWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|source| Error::IoWrite {
        path: config_path.clone(),
        source,
    })?;

    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    format!(
        r#"# ride-dispatch configuration

[routes]
# Target for users whose identity marks them as drivers
driver = "{driver}"

# Target for everyone else (starts driver verification)
verify_driver = "{verify}"

# Startup target for signed-in users
signed_in_home = "/(root)/(tabs)/home"

# Startup target for signed-out users
welcome = "/(auth)/welcome"

[navigator]
# Routes the router accepts. Leave unset to accept the four routes above,
# or set to [] to accept any non-empty route.
# known_routes = ["{driver}", "{verify}"]

# Number of navigation history entries kept
history_limit = 32

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.ride-dispatch/logs/dispatch.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#,
        driver = POST_RIDE_SCREEN,
        verify = VERIFY_DRIVER_SCREEN,
    )
}
