mod cli;
mod commands;
mod config;
mod paths;
mod progress;
mod resources;
mod state;
mod ui;
mod verify;

use anyhow::{Context as AnyhowContext, Result};
use cfapi::Session;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use commands::Context;
use config::{Overrides, ProviderConfig};
use std::io;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        state_path: state::resolve_path(cli.state.as_deref())?,
    };
    let registry = resources::registry();

    match cli.command {
        Command::List { json } => commands::list::tracked(&ctx, json),
        Command::Types => {
            commands::list::types(&registry);
            Ok(())
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "cfprov", &mut io::stdout());
            Ok(())
        }
        command => {
            let session = connect(cli.config.as_deref(), cli.connection)?;
            match command {
                Command::Create {
                    resource_type,
                    name,
                    attrs,
                } => commands::lifecycle::create(
                    &ctx,
                    &session,
                    &registry,
                    &resource_type,
                    &name,
                    attrs,
                ),
                Command::Read { address } => {
                    commands::lifecycle::read(&ctx, &session, &registry, &address)
                }
                Command::Delete { address, yes } => {
                    commands::lifecycle::delete(&ctx, &session, &registry, &address, yes)
                }
                Command::Import {
                    resource_type,
                    name,
                    id,
                    verify,
                } => commands::lifecycle::import(
                    &ctx,
                    &session,
                    &registry,
                    &resource_type,
                    &name,
                    &id,
                    verify,
                ),
                Command::Refresh { jobs } => {
                    commands::refresh::run(&ctx, &session, &registry, jobs)
                }
                Command::VerifyDestroyed { space, names } => {
                    commands::check::destroyed(&ctx, &session, &space, &names)
                }
                Command::VerifyExists { address } => {
                    commands::check::exists(&ctx, &session, &address)
                }
                Command::VerifyGone { resource_type, id } => {
                    commands::check::gone(&ctx, &session, &registry, &resource_type, &id)
                }
                Command::List { .. } | Command::Types | Command::Completions { .. } => Ok(()),
            }
        }
    }
}

/// Build the one controller session every remote command shares
fn connect(config_path: Option<&Path>, conn: cli::ConnectionArgs) -> Result<Session> {
    let path = config::resolve_path(config_path)?;
    let config = ProviderConfig::load(&path)?.with_overrides(Overrides {
        api_url: conn.api_url,
        access_token: conn.access_token,
        skip_ssl_validation: conn.skip_ssl_validation,
    });

    let session_config = config.to_session_config()?;
    log::debug!("Connecting to {}", session_config.api_url);
    Session::connect(&session_config)
        .with_context(|| format!("Could not set up a session for {}", session_config.api_url))
}
