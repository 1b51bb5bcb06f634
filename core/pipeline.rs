use crate::assemble::{resolve_postamble, resolve_preamble, wrap_with_preamble};
use crate::chunking::{Chunk, split_into_line_chunks};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::select::{SelectedFile, Selector};
use crate::strip::strip_comments;
use crate::tokens::split_chunk_by_token_limit;
use log;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub max_lines: usize,
    pub max_tokens: usize,
    pub strip_comments: bool,
    pub include_globs: Vec<String>,
    /// Directories pruned from selection, such as the chunk export directory.
    pub exclude_dirs: Vec<PathBuf>,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_lines: config.effective_max_lines(),
            max_tokens: config.chunking.chunk_size,
            strip_comments: config.chunking.strip_comments,
            include_globs: config.chunking.include_globs.clone(),
            exclude_dirs: vec![config.output.output_dir.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Binary,
    Unreadable(String),
    NotUtf8,
    ChunkingFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub relative_path: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct ChunkRun {
    pub chunks: Vec<Chunk>,
    pub files_chunked: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Selects files under `project_root` and turns them into the ordered chunk
/// sequence, without preamble/postamble. Per-file failures are recorded in
/// `skipped` and do not stop the run.
pub fn build_chunks(project_root: &Path, options: &PipelineOptions) -> Result<ChunkRun> {
    if options.max_lines == 0 || options.max_tokens == 0 {
        return Err(AppError::InvalidArgument(
            "line and token budgets must be positive".to_string(),
        ));
    }

    let files = select_files(project_root, options)?;
    let mut run = ChunkRun::default();

    for file in &files {
        log::debug!("Chunking file: {}", file.relative_path);
        match chunk_file(file, options) {
            Ok(chunks) => {
                run.files_chunked += 1;
                run.chunks.extend(chunks);
            }
            Err(reason) => {
                match &reason {
                    SkipReason::Binary => {
                        log::debug!("Skipping binary file {}", file.relative_path)
                    }
                    other => log::warn!("Skipping {}: {:?}", file.relative_path, other),
                }
                run.skipped.push(SkippedFile {
                    relative_path: file.relative_path.clone(),
                    reason,
                });
            }
        }
    }

    log::info!(
        "Produced {} chunks from {} files ({} skipped).",
        run.chunks.len(),
        run.files_chunked,
        run.skipped.len()
    );
    Ok(run)
}

/// Runs the selector configured by `options`, pruning excluded directories.
pub fn select_files(project_root: &Path, options: &PipelineOptions) -> Result<Vec<SelectedFile>> {
    let mut selector = Selector::for_root(project_root, &options.include_globs)?;
    for dir in &options.exclude_dirs {
        selector = selector.exclude_dir(dir);
    }
    selector.select()
}

/// Full run: builds the chunks, then wraps them with the configured or
/// default preamble/postamble once the total count is known.
pub fn generate_chunks(project_root: &Path, config: &Config) -> Result<ChunkRun> {
    config.validate()?;
    let options = PipelineOptions::from_config(config);
    let mut run = build_chunks(project_root, &options)?;

    let repo_name = config.get_effective_repo_name(project_root);
    let preamble = resolve_preamble(config, &repo_name, run.chunks.len());
    let postamble = resolve_postamble(config);
    wrap_with_preamble(&mut run.chunks, &preamble, &postamble);
    Ok(run)
}

/// Strips (when enabled), line-splits and token-splits one file's text.
pub fn chunk_text(file_path: &str, content: &str, options: &PipelineOptions) -> Result<Vec<Chunk>> {
    let content = strip_comments(content, options.strip_comments);
    let line_chunks = split_into_line_chunks(file_path, &content, options.max_lines)?;

    let mut chunks = Vec::with_capacity(line_chunks.len());
    for line_chunk in &line_chunks {
        chunks.extend(split_chunk_by_token_limit(line_chunk, options.max_tokens)?);
    }
    Ok(chunks)
}

fn chunk_file(
    file: &SelectedFile,
    options: &PipelineOptions,
) -> std::result::Result<Vec<Chunk>, SkipReason> {
    let content = read_text_file(&file.path)?;
    chunk_text(&file.relative_path, &content, options)
        .map_err(|e| SkipReason::ChunkingFailed(e.to_string()))
}

/// Reads a file as UTF-8 text, classifying why it cannot be chunked.
pub fn read_text_file(path: &Path) -> std::result::Result<String, SkipReason> {
    let bytes = fs::read(path).map_err(|e| {
        SkipReason::Unreadable(
            AppError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
            .to_string(),
        )
    })?;
    if is_binary(&bytes) {
        return Err(SkipReason::Binary);
    }
    String::from_utf8(bytes).map_err(|e| {
        log::debug!("{} is not valid UTF-8: {}", path.display(), e);
        SkipReason::NotUtf8
    })
}

/// A NUL byte anywhere marks the content as binary.
pub fn is_binary(data: &[u8]) -> bool {
    data.contains(&0)
}
