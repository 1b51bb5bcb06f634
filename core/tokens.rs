use crate::chunking::Chunk;
use crate::error::{AppError, Result};

/// Average tokens per whitespace-delimited word for GPT-style tokenizers.
pub const TOKENS_PER_WORD: f64 = 1.3;
pub const CHARS_PER_TOKEN: usize = 4;

/// Word-count heuristic: words * 1.3, rounded to nearest.
pub fn estimate_tokens_by_words(text: &str) -> usize {
    tokens_for_word_count(text.split_whitespace().count())
}

/// Character-count heuristic: chars / 4, rounded up.
pub fn estimate_tokens_by_chars(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

fn tokens_for_word_count(words: usize) -> usize {
    (words as f64 * TOKENS_PER_WORD + 0.5) as usize
}

/// Re-splits `content` on line boundaries so each part stays within
/// `max_tokens` by the word estimate. A line that alone exceeds the budget
/// becomes its own part and is never cut.
pub fn split_by_token_limit(content: &str, max_tokens: usize) -> Result<Vec<String>> {
    if max_tokens == 0 {
        return Err(AppError::Chunking(
            "Token budget must be greater than 0".to_string(),
        ));
    }

    let mut parts = Vec::new();
    let mut current_lines: Vec<&str> = Vec::new();
    let mut current_words = 0usize;

    for line in content.split('\n') {
        let line_words = line.split_whitespace().count();
        if !current_lines.is_empty()
            && tokens_for_word_count(current_words + line_words) > max_tokens
        {
            parts.push(current_lines.join("\n"));
            current_lines.clear();
            current_words = 0;
        }
        current_lines.push(line);
        current_words += line_words;
    }
    if !current_lines.is_empty() {
        parts.push(current_lines.join("\n"));
    }

    Ok(parts)
}

/// Applies [`split_by_token_limit`] to a line chunk, keeping its file path.
pub fn split_chunk_by_token_limit(chunk: &Chunk, max_tokens: usize) -> Result<Vec<Chunk>> {
    let parts = split_by_token_limit(&chunk.content, max_tokens)?;
    if parts.len() > 1 {
        log::trace!(
            "{}: line chunk re-split into {} token-bounded parts",
            chunk.file_path,
            parts.len()
        );
    }
    Ok(parts
        .into_iter()
        .map(|part| Chunk::new(chunk.file_path.clone(), part))
        .collect())
}
