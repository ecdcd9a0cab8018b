// ABOUTME: Main entry point for the kitty-img application
// ABOUTME: Parses arguments, loads config and dispatches to command handlers

use anyhow::Result;
use clap::Parser;
use kitty_graphics::GraphicsError;
use kitty_img::cli::{Cli, Commands};
use kitty_img::commands::{self, Settings};
use kitty_img::config::Config;
use kitty_img::detection::TerminalCapabilities;
use std::io::{self, Write};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        if let Some(help) = e
            .downcast_ref::<GraphicsError>()
            .and_then(GraphicsError::help_text)
        {
            eprintln!();
            eprintln!("{}", help);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let force = cli.force || config.force.unwrap_or(false);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Show {
            file,
            placement,
            no_play,
            loops,
        } => {
            warn_if_unsupported(force);
            let mut settings = Settings::resolve(&config, &placement);
            if let Some(loops) = loops {
                settings.loop_count = loops;
            }
            commands::show(&mut out, &file, &settings, !no_play)?;
        }
        Commands::Local { file, placement } => {
            warn_if_unsupported(force);
            let settings = Settings::resolve(&config, &placement);
            commands::local(&mut out, &file, &settings)?;
        }
        Commands::Clean { id } => commands::clean(&mut out, id)?,
    }

    out.flush()?;
    Ok(())
}

fn warn_if_unsupported(force: bool) {
    if force {
        return;
    }
    let caps = TerminalCapabilities::detect();
    if !caps.supports_kitty_images {
        log::warn!(
            "terminal '{}' does not appear to support kitty graphics; use --force to silence",
            caps.terminal_name
        );
    }
}
