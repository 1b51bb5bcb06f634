use anyhow::{Context, Result};
use chunky_core::{AppError, Chunk, FormatType, format_chunk_numbered};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::commands::stats::ProjectStats;

pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file_name: String,
    pub source_file: String,
}

/// Writes one file per chunk (`000_chunk.txt`, ...) plus `manifest.json`.
/// A chunk that fails to format or write is logged and left out of the
/// manifest; failing to create the directory or the manifest is fatal.
pub fn export_chunks(
    chunks: &[Chunk],
    format: FormatType,
    out_dir: &Path,
) -> Result<Vec<ManifestEntry>> {
    fs::create_dir_all(out_dir).map_err(|e| AppError::DirCreation {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let mut manifest = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let formatted = match format_chunk_numbered(chunk, i, format) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Error formatting chunk {} ({}): {}", i, chunk.file_path, e);
                continue;
            }
        };

        let file_name = format!("{:03}_chunk.{}", i, format.extension());
        let full_path = out_dir.join(&file_name);
        if let Err(e) = write_to_file(&full_path, &formatted) {
            log::warn!("Error writing chunk file {}: {:#}", full_path.display(), e);
            continue;
        }
        log::trace!("Wrote {}", full_path.display());

        manifest.push(ManifestEntry {
            file_name,
            source_file: chunk.file_path.clone(),
        });
    }

    let manifest_path = out_dir.join(MANIFEST_FILENAME);
    let manifest_json = serde_json::to_string_pretty(&manifest).map_err(AppError::JsonSerialize)?;
    fs::write(&manifest_path, manifest_json).map_err(|e| AppError::FileWrite {
        path: manifest_path.clone(),
        source: e,
    })?;

    log::info!(
        "Exported {} chunk files to {}",
        manifest.len(),
        out_dir.display()
    );
    Ok(manifest)
}

pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to file {}", path.display()))?;
    Ok(())
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub fn print_stats_pretty_table(stats: &ProjectStats) -> Result<()> {
    println!();
    println!("{}", " Project Statistics ".green().bold().underline());
    println!(
        "{:<22} {}",
        "Total Files:".green(),
        stats.total_files.to_string().cyan()
    );
    println!(
        "{:<22} {}",
        "Total Lines:".green(),
        stats.total_lines.to_string().cyan()
    );
    println!(
        "{:<22} {}",
        "Total Size:".green(),
        stats.total_bytes_readable.cyan()
    );
    println!(
        "{:<22} {}",
        "Est. Tokens (words):".green(),
        stats.word_estimate.to_string().cyan()
    );
    println!(
        "{:<22} {}",
        "Est. Tokens (chars):".green(),
        stats.char_estimate.to_string().cyan()
    );
    println!(
        "{:<22} {}",
        "cl100k Tokens:".green(),
        stats.cl100k_tokens.to_string().cyan()
    );
    println!(
        "{:<22} {}",
        "Estimated Chunks:".green(),
        stats.estimated_chunks.to_string().cyan()
    );

    if stats.files.is_empty() {
        println!("\n{}", "(No files selected)".yellow());
    } else {
        println!("\n{}", " File Details ".green().bold().underline());
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Path").fg(Color::Green),
            Cell::new("Lines").fg(Color::Green),
            Cell::new("Size").fg(Color::Green),
            Cell::new("Words Est.").fg(Color::Green),
            Cell::new("Chars Est.").fg(Color::Green),
            Cell::new("cl100k").fg(Color::Green),
            Cell::new("Chunks").fg(Color::Green),
        ]);
        for file in &stats.files {
            table.add_row(vec![
                Cell::new(&file.path).fg(Color::Cyan),
                Cell::new(file.lines).set_alignment(comfy_table::CellAlignment::Right),
                Cell::new(&file.bytes_readable)
                    .set_alignment(comfy_table::CellAlignment::Right)
                    .fg(Color::DarkGrey),
                Cell::new(file.word_estimate).set_alignment(comfy_table::CellAlignment::Right),
                Cell::new(file.char_estimate).set_alignment(comfy_table::CellAlignment::Right),
                Cell::new(file.cl100k_tokens).set_alignment(comfy_table::CellAlignment::Right),
                Cell::new(file.chunks).set_alignment(comfy_table::CellAlignment::Right),
            ]);
        }
        println!("{table}");
    }
    if !stats.skipped.is_empty() {
        println!(
            "\n{} {}",
            "Skipped files:".yellow(),
            stats.skipped.len().to_string().yellow()
        );
        for path in &stats.skipped {
            println!(" - {}", path.dimmed());
        }
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn export_writes_numbered_files_and_manifest() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("chunk_output").join("demo");
        let chunks = vec![
            Chunk::new("src/main.go", "package main"),
            Chunk::new("src/util.go", "package util"),
        ];

        let manifest = export_chunks(&chunks, FormatType::Md, &out_dir).unwrap();
        assert_eq!(
            manifest,
            vec![
                ManifestEntry {
                    file_name: "000_chunk.md".to_string(),
                    source_file: "src/main.go".to_string(),
                },
                ManifestEntry {
                    file_name: "001_chunk.md".to_string(),
                    source_file: "src/util.go".to_string(),
                },
            ]
        );

        let second = fs::read_to_string(out_dir.join("001_chunk.md")).unwrap();
        assert!(second.starts_with("## Chunk 1: src/util.go\n\n```go\n"));

        let written: Vec<ManifestEntry> =
            serde_json::from_str(&fs::read_to_string(out_dir.join(MANIFEST_FILENAME)).unwrap())
                .unwrap();
        assert_eq!(written, manifest);
    }

    #[test]
    fn failed_chunk_write_is_skipped_and_left_out_of_manifest() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("000_chunk.txt")).unwrap();
        let chunks = vec![Chunk::new("a.txt", "alpha"), Chunk::new("b.txt", "beta")];

        let manifest = export_chunks(&chunks, FormatType::Txt, dir.path()).unwrap();
        assert_eq!(
            manifest,
            vec![ManifestEntry {
                file_name: "001_chunk.txt".to_string(),
                source_file: "b.txt".to_string(),
            }]
        );
        assert!(dir.path().join("000_chunk.txt").is_dir());
        let written: Vec<ManifestEntry> = serde_json::from_str(
            &fs::read_to_string(dir.path().join(MANIFEST_FILENAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(written, manifest);
    }

    #[test]
    fn export_of_empty_sequence_writes_empty_manifest() {
        let dir = TempDir::new().unwrap();
        let manifest = export_chunks(&[], FormatType::Json, dir.path()).unwrap();
        assert!(manifest.is_empty());
        let text = fs::read_to_string(dir.path().join(MANIFEST_FILENAME)).unwrap();
        assert_eq!(text, "[]");
    }
}
