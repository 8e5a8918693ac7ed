mod archive;
mod cli;
mod config;
mod converter;
mod error;
mod file_kind;
mod locator;
mod modes;
mod output;
mod pipeline;
#[cfg(test)]
mod test_support;
mod watcher;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, GlobalArgs};
use config::ConverterConfig;
use modes::MenuChoice;
use output::{format_size, print_summary};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = resolve_config(&cli.global);

    for dir in [&config.upload_dir, &config.download_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create working directory {}", dir.display()))?;
    }

    match cli.command {
        Some(Commands::Batch {
            dir,
            recursive,
            json,
        }) => {
            let summary = modes::batch(&config, &dir, recursive)?;
            print_summary(&summary, json);
        }
        Some(Commands::Watch { dir }) => {
            let summary = modes::monitor(&config, &dir)?;
            print_summary(&summary, false);
        }
        Some(Commands::Convert { file, json }) => {
            let summary = modes::single(&config, &file);
            print_summary(&summary, json);
        }
        Some(Commands::Archive { json }) => run_archive(&config, json)?,
        None => run_interactive(&config)?,
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for `--json` consumers.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact()
        .init();
}

/// Defaults, then the config file, then the environment, then flags.
fn resolve_config(global: &GlobalArgs) -> ConverterConfig {
    let mut config = ConverterConfig::load(global.config.as_deref()).with_env_overrides();
    if let Some(dir) = &global.upload_dir {
        config.upload_dir = dir.clone();
    }
    if let Some(dir) = &global.download_dir {
        config.download_dir = dir.clone();
    }
    config
}

fn run_archive(config: &ConverterConfig, json: bool) -> Result<()> {
    info!("upload folder: {}", config.upload_dir.display());
    let report = archive::archive(&config.upload_dir, &config.download_dir)?;

    match (report, json) {
        (Some(report), true) => println!("{}", serde_json::to_string_pretty(&report)?),
        (Some(report), false) => {
            println!("Created {}", report.path.display());
            println!("  {} file(s), {}", report.entries, format_size(report.size_bytes));
        }
        (None, true) => println!("null"),
        (None, false) => println!("No PNG files found; no archive created."),
    }
    Ok(())
}

fn run_interactive(config: &ConverterConfig) -> Result<()> {
    info!("=== PSD to PNG converter ===");
    let stdin = std::io::stdin();
    let choice = modes::prompt_menu(&mut stdin.lock(), &mut std::io::stdout())?;

    match choice {
        Some(MenuChoice::Batch(dir)) => print_summary(&modes::batch(config, &dir, false)?, false),
        Some(MenuChoice::Watch(dir)) => print_summary(&modes::monitor(config, &dir)?, false),
        Some(MenuChoice::Convert(file)) => print_summary(&modes::single(config, &file), false),
        None => {}
    }

    info!("=== done ===");
    Ok(())
}
