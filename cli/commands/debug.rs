use crate::cli_args::DebugArgs;
use crate::load_config_for_command;
use crate::output::write_to_stdout;
use anyhow::{Context, Result};
use chunky_core::{self as core, AppError, Config, PipelineOptions, SelectedFile};
use colored::*;
use log;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct DebugInfo<'a> {
    project_root: &'a Path,
    effective_config: &'a Config,
    selected_files: Vec<&'a str>,
}

pub fn handle_debug_command(args: DebugArgs) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.local_path.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(&project_root, &args.project_config, &args.chunking)
        .context("Failed to load configuration for debug command")?;
    config.validate()?;

    log::debug!("Debug: Selecting files...");
    let files = core::select_files(&project_root, &PipelineOptions::from_config(&config))
        .context("Failed to select files for debug")?;

    let debug_data = DebugInfo {
        project_root: &project_root,
        effective_config: &config,
        selected_files: files.iter().map(|f| f.relative_path.as_str()).collect(),
    };

    if args.json {
        let content = serde_json::to_string_pretty(&debug_data)
            .context("Failed to serialize debug info to JSON")?;
        write_to_stdout(&content)
    } else {
        print_debug_info_pretty(&debug_data, &files)
    }
}

fn print_debug_info_pretty(debug_info: &DebugInfo, files: &[SelectedFile]) -> Result<()> {
    println!(
        "{}",
        "\n--- Effective Configuration ---"
            .green()
            .bold()
            .underline()
    );
    println!("{} {}", "Project root:".bold(), debug_info.project_root.display());
    let config_toml =
        toml::to_string_pretty(debug_info.effective_config).map_err(AppError::TomlSerialize)?;
    println!("{}", config_toml);

    println!(
        "{}",
        format!("\n--- Selected Files ({}) ---", files.len())
            .green()
            .bold()
            .underline()
    );
    if files.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        // Walk order is the chunk order, so it is printed as-is.
        for file in files {
            println!("- {}", file.relative_path.cyan());
        }
    }

    println!("{}", "\n--- End Debug Info ---".green().bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_args::{ChunkingOpts, ProjectConfigOpts};
    use tempfile::TempDir;

    fn debug_args(root: &Path) -> DebugArgs {
        DebugArgs {
            project_config: ProjectConfigOpts {
                local_path: Some(root.to_path_buf()),
                no_config: false,
            },
            chunking: ChunkingOpts::default(),
            json: true,
        }
    }

    #[test]
    fn invalid_config_is_reported_instead_of_printed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(chunky_core::config::CONFIG_FILENAME),
            "[output]\nformat = \"xml\"\n",
        )
        .unwrap();
        let err = handle_debug_command(debug_args(dir.path())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::InvalidArgument(_))
        ));

        let mut args = debug_args(dir.path());
        args.project_config.no_config = true;
        args.chunking.max_lines = Some(0);
        let err = handle_debug_command(args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn valid_config_prints_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        assert!(handle_debug_command(debug_args(dir.path())).is_ok());
    }
}
