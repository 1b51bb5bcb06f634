use crate::cli_args::StatsArgs;
use crate::load_config_for_command;
use crate::output::{print_stats_pretty_table, write_to_stdout};
use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use chunky_core::{
    self as core, Config, PipelineOptions, estimate_tokens_by_chars, estimate_tokens_by_words,
};
use log;
use serde::Serialize;
use tiktoken_rs::{CoreBPE, cl100k_base};

#[derive(Debug, Serialize)]
pub struct ProjectStats {
    pub total_files: usize,
    pub total_lines: usize,
    pub total_bytes: u128,
    pub total_bytes_readable: String,
    pub word_estimate: usize,
    pub char_estimate: usize,
    pub cl100k_tokens: usize,
    pub estimated_chunks: usize,
    pub files: Vec<FileStats>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FileStats {
    pub path: String,
    pub lines: usize,
    pub bytes: usize,
    pub bytes_readable: String,
    pub word_estimate: usize,
    pub char_estimate: usize,
    pub cl100k_tokens: usize,
    pub chunks: usize,
}

pub fn handle_stats_command(args: StatsArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.local_path.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(&project_root, &args.project_config, &args.chunking)
        .context("Failed to load configuration for stats command")?;
    config.validate()?;
    let options = PipelineOptions::from_config(&config);

    let files = core::select_files(&project_root, &options)
        .context("Failed to select files for stats")?;

    if files.is_empty() {
        if !quiet {
            println!("No files selected to calculate statistics.");
        }
        return Ok(());
    }

    let bpe =
        cl100k_base().map_err(|e| anyhow::anyhow!(core::AppError::TikToken(e.to_string())))?;
    let stats = calculate_stats(&files, &options, &bpe);

    if args.json {
        let content = serde_json::to_string_pretty(&stats).map_err(core::AppError::JsonSerialize)?;
        write_to_stdout(&content)
    } else {
        print_stats_pretty_table(&stats)
    }
}

fn calculate_stats(
    files: &[core::SelectedFile],
    options: &PipelineOptions,
    bpe: &CoreBPE,
) -> ProjectStats {
    let mut details = Vec::new();
    let mut skipped = Vec::new();
    let mut total_bytes: u128 = 0;

    for file in files {
        let content = match core::read_text_file(&file.path) {
            Ok(content) => content,
            Err(reason) => {
                log::debug!("Stats: skipping {} ({:?})", file.relative_path, reason);
                skipped.push(file.relative_path.clone());
                continue;
            }
        };
        let chunks = match core::chunk_text(&file.relative_path, &content, options) {
            Ok(chunks) => chunks.len(),
            Err(e) => {
                log::warn!("Stats: could not chunk {}: {}", file.relative_path, e);
                0
            }
        };

        let bytes = content.len();
        total_bytes = total_bytes.saturating_add(bytes as u128);
        details.push(FileStats {
            path: file.relative_path.clone(),
            lines: content.lines().count(),
            bytes,
            bytes_readable: readable_size(bytes as u128),
            word_estimate: estimate_tokens_by_words(&content),
            char_estimate: estimate_tokens_by_chars(&content),
            cl100k_tokens: bpe.encode_ordinary(&content).len(),
            chunks,
        });
    }

    ProjectStats {
        total_files: details.len(),
        total_lines: details.iter().map(|f| f.lines).sum(),
        total_bytes,
        total_bytes_readable: readable_size(total_bytes),
        word_estimate: details.iter().map(|f| f.word_estimate).sum(),
        char_estimate: details.iter().map(|f| f.char_estimate).sum(),
        cl100k_tokens: details.iter().map(|f| f.cl100k_tokens).sum(),
        estimated_chunks: details.iter().map(|f| f.chunks).sum(),
        files: details,
        skipped,
    }
}

fn readable_size(bytes: u128) -> String {
    Byte::from_u128(bytes)
        .unwrap_or_default()
        .get_appropriate_unit(UnitType::Binary)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_args::{ChunkingOpts, ProjectConfigOpts};
    use chunky_core::AppError;
    use std::fs;
    use tempfile::TempDir;

    fn stats_args(root: &std::path::Path) -> StatsArgs {
        StatsArgs {
            project_config: ProjectConfigOpts {
                local_path: Some(root.to_path_buf()),
                no_config: true,
            },
            chunking: ChunkingOpts::default(),
            json: true,
        }
    }

    #[test]
    fn empty_selection_returns_early_regardless_of_quiet() {
        let dir = TempDir::new().unwrap();
        assert!(handle_stats_command(stats_args(dir.path()), true).is_ok());
        assert!(handle_stats_command(stats_args(dir.path()), false).is_ok());
    }

    #[test]
    fn invalid_budget_fails_before_selection() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        let mut args = stats_args(dir.path());
        args.chunking.chunk_size = Some(0);
        let err = handle_stats_command(args, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::InvalidArgument(_))
        ));
    }
}
