mod cli;
mod commands;
mod config;
mod engine;
mod resource;
mod schema;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, ConfigCommand};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub manifest: PathBuf,
    pub state: Option<PathBuf>,
    pub url: Option<String>,
    pub token: Option<String>,
}

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
        manifest: cli.manifest,
        state: cli.state,
        url: cli.url,
        token: cli.token,
    };

    match cli.command {
        Command::Plan(args) => commands::lifecycle::plan(&ctx, args.target.as_deref()),
        Command::Apply(args) => commands::lifecycle::apply(
            &ctx,
            &commands::lifecycle::ApplyOptions {
                target: args.target,
                dry_run: args.dry_run,
                yes: args.yes,
                jobs: args.jobs.max(1),
            },
        ),
        Command::Refresh(args) => commands::lifecycle::refresh(&ctx, args.target.as_deref()),
        Command::Destroy(args) => {
            commands::lifecycle::destroy(&ctx, args.target.as_deref(), args.yes)
        }
        Command::Import { address, id } => commands::import::run(&ctx, &address, &id),
        Command::Show { address, json } => commands::show::run(&ctx, address.as_deref(), json),
        Command::Config(ConfigCommand::Show) => commands::config::show(&ctx),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "oidc-provisioner", &mut io::stdout());
            Ok(())
        }
    }
}
