use crate::chunking::Chunk;
use crate::error::{AppError, Result};
use crate::languages::fence_language_for_path;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    Txt,
    Md,
    Json,
}

impl FormatType {
    pub fn extension(self) -> &'static str {
        match self {
            FormatType::Txt => "txt",
            FormatType::Md => "md",
            FormatType::Json => "json",
        }
    }
}

impl FromStr for FormatType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "txt" => Ok(FormatType::Txt),
            "md" => Ok(FormatType::Md),
            "json" => Ok(FormatType::Json),
            other => Err(AppError::InvalidArgument(format!(
                "invalid format \"{}\"; must be one of: txt, md, json",
                other
            ))),
        }
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serializes the whole chunk sequence. Markdown headings are numbered from
/// zero in sequence order.
pub fn format_chunks(chunks: &[Chunk], format: FormatType) -> Result<String> {
    match format {
        FormatType::Txt => Ok(chunks.iter().map(txt_block).collect()),
        FormatType::Md => Ok(chunks
            .iter()
            .enumerate()
            .map(|(i, c)| md_block(c, i))
            .collect()),
        FormatType::Json => to_json(chunks),
    }
}

/// Serializes one chunk for its own output file, tagged with its position.
pub fn format_chunk_numbered(chunk: &Chunk, index: usize, format: FormatType) -> Result<String> {
    match format {
        FormatType::Txt => Ok(format!(
            "== Chunk {}: FILE: {} ==\n{}\n\n",
            index, chunk.file_path, chunk.content
        )),
        FormatType::Md => Ok(md_block(chunk, index)),
        FormatType::Json => to_json(std::slice::from_ref(chunk)),
    }
}

/// Reads back the `json` encoding.
pub fn parse_json_chunks(data: &str) -> Result<Vec<Chunk>> {
    serde_json::from_str(data).map_err(AppError::JsonSerialize)
}

fn txt_block(chunk: &Chunk) -> String {
    format!("== FILE: {} ==\n{}\n\n", chunk.file_path, chunk.content)
}

fn md_block(chunk: &Chunk, index: usize) -> String {
    let lang = fence_language_for_path(&chunk.file_path);
    format!(
        "## Chunk {}: {}\n\n```{}\n{}\n```\n\n",
        index, chunk.file_path, lang, chunk.content
    )
}

fn to_json(chunks: &[Chunk]) -> Result<String> {
    serde_json::to_string_pretty(chunks).map_err(AppError::JsonSerialize)
}
