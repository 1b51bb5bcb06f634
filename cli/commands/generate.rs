use crate::cli_args::GenerateArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use chunky_core::{self as core, Config, SkipReason};
use colored::Colorize;
use log;
use std::path::PathBuf;

pub fn handle_generate_command(args: GenerateArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.local_path.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let mut config = load_config_for_command(&project_root, &args.project_config, &args.chunking)
        .context("Failed to load configuration")?;
    apply_output_overrides(&mut config, &args);
    config.validate()?;
    let format = config.format_type()?;

    let run = core::generate_chunks(&project_root, &config)
        .context("Failed to build chunks for project")?;

    if !run.skipped.is_empty() && !quiet {
        eprintln!("\n{}", "Warning: Some files were skipped:".yellow());
        for skipped in &run.skipped {
            let reason = match &skipped.reason {
                SkipReason::Binary => "binary".to_string(),
                SkipReason::NotUtf8 => "not UTF-8".to_string(),
                SkipReason::Unreadable(e) => e.clone(),
                SkipReason::ChunkingFailed(e) => e.clone(),
            };
            eprintln!(" - {} ({})", skipped.relative_path, reason);
        }
        eprintln!("---");
    }

    // Format the aggregate before touching disk so a failure leaves no output.
    let combined = core::format_chunks(&run.chunks, format)
        .context("Failed to format combined chunk output")?;

    if config.output.save_chunks {
        let repo_name = config.get_effective_repo_name(&project_root);
        let out_dir = chunk_output_dir(&config, &repo_name);
        let manifest = output::export_chunks(&run.chunks, format, &out_dir)
            .with_context(|| format!("Failed to export chunks to {}", out_dir.display()))?;
        if !quiet {
            eprintln!(
                "{} {} chunk files saved in: {}",
                "✅".green(),
                manifest.len(),
                out_dir.display().to_string().blue()
            );
        }
    } else {
        log::debug!("Chunk file export disabled.");
    }

    output::write_to_stdout(&combined)
}

fn apply_output_overrides(config: &mut Config, args: &GenerateArgs) {
    if let Some(format) = &args.format {
        config.output.format = format.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output.output_dir = dir.clone();
    }
    if args.no_save {
        config.output.save_chunks = false;
    }
}

fn chunk_output_dir(config: &Config, repo_name: &str) -> PathBuf {
    config.output.output_dir.join(repo_name)
}
