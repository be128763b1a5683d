//! CLI argument parsing using clap v4

use clap::{Parser, Subcommand};

/// ride-dispatch - role-gated navigation for the ride-sharing client
///
/// Resolves whether the signed-in user is a driver, records the result and
/// routes them to posting a ride or to driver verification.
#[derive(Parser, Debug)]
#[command(name = "ride-dispatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Press the post-ride control once for an identity
    Dispatch {
        /// Path to configuration file
        #[arg(short, long, env = "RIDE_DISPATCH_CONFIG")]
        config: Option<String>,

        /// Identity snapshot file (JSON)
        #[arg(short, long, conflicts_with_all = ["role", "not_loaded"])]
        identity: Option<String>,

        /// Role claimed by the identity (driver, rider, anything else = none)
        #[arg(short, long)]
        role: Option<String>,

        /// Treat the identity as still loading
        #[arg(long)]
        not_loaded: bool,

        /// Print a JSON report instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Print the startup redirect target
    Redirect {
        /// Path to configuration file
        #[arg(short, long, env = "RIDE_DISPATCH_CONFIG")]
        config: Option<String>,

        /// The user has an active session
        #[arg(long)]
        signed_in: bool,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long, env = "RIDE_DISPATCH_CONFIG")]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long, env = "RIDE_DISPATCH_CONFIG")]
        config: Option<String>,
    },
}
