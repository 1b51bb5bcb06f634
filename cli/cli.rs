mod cli_args;
mod commands;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::Path;
use std::process;

use chunky_core::{AppError, Config, parse_include_globs};
use cli_args::{ChunkingOpts, Cli, Commands, ProjectConfigOpts};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);

            // Config and argument errors are shown even in quiet mode.
            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<AppError>() {
        Some(AppError::TomlParse(_)) => 1,
        Some(AppError::TomlSerialize(_)) => 1,
        Some(AppError::Io(_)) => 2,
        Some(AppError::FileRead { .. }) => 2,
        Some(AppError::FileWrite { .. }) => 2,
        Some(AppError::DirCreation { .. }) => 2,
        Some(AppError::WalkDir(_)) => 2,
        Some(AppError::Ignore(_)) => 2,
        Some(AppError::Glob(_)) => 2,
        Some(AppError::Chunking(_)) => 3,
        Some(AppError::InvalidArgument(_)) => 5,
        Some(AppError::JsonSerialize(_)) => 6,
        Some(AppError::TikToken(_)) => 8,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(Commands::Generate(args)) => {
            log::debug!("Executing 'generate' command...");
            commands::generate::handle_generate_command(args, quiet)?;
        }
        Some(Commands::Stats(args)) => {
            log::debug!("Executing 'stats' command...");
            commands::stats::handle_stats_command(args, quiet)?;
        }
        Some(Commands::Debug(args)) => {
            log::debug!("Executing 'debug' command...");
            commands::debug::handle_debug_command(args)?;
        }
        Some(Commands::Completion(args)) => {
            log::debug!("Executing 'completion' command...");
            commands::completion::handle_completion_command(&args)?;
        }
    }
    Ok(())
}

fn merge_config_with_cli_overrides(mut config: Config, chunking: &ChunkingOpts) -> Config {
    log::trace!("Applying CLI overrides to config...");

    if let Some(size) = chunking.chunk_size {
        config.chunking.chunk_size = size;
    }
    if let Some(lines) = chunking.max_lines {
        config.chunking.max_lines = Some(lines);
    }
    if chunking.no_comments {
        config.chunking.strip_comments = true;
    }
    if let Some(raw) = &chunking.include_globs {
        config.chunking.include_globs = parse_include_globs(raw);
    }

    log::trace!("Config after CLI overrides: {:?}", config);
    config
}

/// Loads `.chunkyconfig` (unless disabled) and applies the shared chunking
/// overrides. Command-specific overrides are applied by the caller.
pub fn load_config_for_command(
    project_root: &Path,
    project_opts: &ProjectConfigOpts,
    chunking: &ChunkingOpts,
) -> Result<Config> {
    let config = if project_opts.no_config {
        log::debug!("Config file loading disabled via CLI flag.");
        Config::default()
    } else {
        Config::load_for_root(project_root)?
    };
    Ok(merge_config_with_cli_overrides(config, chunking))
}
