use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// One unit of output text tagged with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub file_path: String,
    pub content: String,
}

impl Chunk {
    pub fn new(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            content: content.into(),
        }
    }
}

/// Splits `content` on `\n` into contiguous groups of at most `max_lines`
/// lines. Empty content produces no chunks.
pub fn split_into_line_chunks(
    file_path: &str,
    content: &str,
    max_lines: usize,
) -> Result<Vec<Chunk>> {
    if max_lines == 0 {
        return Err(AppError::Chunking(
            "Line budget must be greater than 0".to_string(),
        ));
    }
    if content.is_empty() {
        log::trace!("Skipping empty content for {}", file_path);
        return Ok(Vec::new());
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let chunks: Vec<Chunk> = lines
        .chunks(max_lines)
        .map(|group| Chunk::new(file_path, group.join("\n")))
        .collect();

    log::trace!(
        "{}: {} lines split into {} line chunks",
        file_path,
        lines.len(),
        chunks.len()
    );
    Ok(chunks)
}
