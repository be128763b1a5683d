//! ride-dispatch - role-gated navigation for the ride-sharing client
//!
//! Entry point for the `ride-dispatch` binary. `dispatch` presses the
//! post-ride control once for an identity snapshot; `redirect` prints the
//! startup target for a session.

mod cli;
mod config;
mod control;
mod dispatcher;
mod error;
mod identity;
mod logging;
mod navigator;
mod redirect;
mod store;
mod version;

use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::cli::{Cli, Commands, ConfigSubcommand};
use crate::config::DispatchConfig;
use crate::control::DispatchControl;
use crate::dispatcher::{DispatchResult, RoleGatedDispatcher};
use crate::error::{Error, Result};
use crate::identity::{FileIdentityProvider, IdentityProvider, StaticIdentityProvider};
use crate::redirect::{startup_redirect, AuthSession};
use crate::store::RoleState;

/// Outcome of one `dispatch` invocation, as printed with `--json`
#[derive(Debug, Serialize)]
struct DispatchReport {
    dispatch_id: Uuid,
    at: DateTime<Utc>,
    loaded: bool,
    is_driver: bool,
    role_written: bool,
    result: DispatchResult,
    screen: Option<String>,
    history: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Version => {
            version::print_version();
            Ok(())
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_config_command(subcommand)
        }
        Commands::Dispatch {
            config,
            identity,
            role,
            not_loaded,
            json,
        } => {
            let config = DispatchConfig::load(config.as_deref())?;
            let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;
            config.warn_unroutable_targets();

            let provider: Box<dyn IdentityProvider> = match identity {
                Some(path) => Box::new(FileIdentityProvider::new(path)),
                None => Box::new(StaticIdentityProvider::from_flags(role.as_deref(), not_loaded)),
            };

            run_dispatch(&config, provider.as_ref(), json)
        }
        Commands::Redirect { config, signed_in } => {
            let config = DispatchConfig::load(config.as_deref())?;
            let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

            let target = startup_redirect(&AuthSession { signed_in }, &config.routes);
            info!(signed_in, route = %target, "Startup redirect");
            println!("{}", target);
            Ok(())
        }
    }
}

/// Load one identity snapshot and press the control with it
fn run_dispatch(config: &DispatchConfig, provider: &dyn IdentityProvider, json: bool) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))?;
    let identity = runtime.block_on(provider.snapshot())?;

    let state = RoleState::new();
    let dispatcher = RoleGatedDispatcher::with_targets(
        state.clone(),
        config.build_navigator(),
        config.dispatch_targets(),
    );
    let control = DispatchControl::new(dispatcher);

    let dispatch_id = Uuid::new_v4();
    info!(
        %dispatch_id,
        loaded = identity.loaded,
        control = ?control.state(&identity),
        "Control pressed"
    );
    if !control.is_enabled(&identity) {
        debug!(%dispatch_id, "Control is disabled, press will not navigate");
    }

    let result = control.press(&identity);
    info!(
        %dispatch_id,
        is_driver = state.is_driver(),
        result = %result,
        current = ?control.dispatcher().navigator().current(),
        "Dispatch settled"
    );

    let report = DispatchReport {
        dispatch_id,
        at: Utc::now(),
        loaded: identity.loaded,
        is_driver: state.is_driver(),
        role_written: state.writes() > 0,
        screen: result.target().map(str::to_string),
        history: control.dispatcher().navigator().history(),
        result,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("result: {}", report.result);
        println!("driver: {}", report.is_driver);
        if let Some(screen) = &report.screen {
            println!("screen: {}", screen);
        }
    }

    match report.result {
        DispatchResult::Failed(reason) => {
            let err = Error::dispatch_failed(reason);
            error!(%dispatch_id, "{}", err.format_for_log());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Handle config subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = DispatchConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration file created: {}", written.display());
        }
        ConfigSubcommand::Validate { config } => {
            DispatchConfig::load(config.as_deref())?.warn_unroutable_targets();
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
