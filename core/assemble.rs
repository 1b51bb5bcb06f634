use crate::chunking::Chunk;
use crate::config::Config;

pub const PREAMBLE_START: &str = "-- PREAMBLE START --";
pub const PREAMBLE_END: &str = "-- PREAMBLE END --";
pub const POSTAMBLE_START: &str = "-- POSTAMBLE START --";
pub const POSTAMBLE_END: &str = "-- POSTAMBLE END --";

/// Configured preamble text, or a default naming the repository and the
/// total chunk count.
pub fn resolve_preamble(config: &Config, repo_name: &str, total_chunks: usize) -> String {
    if !config.preamble.text.trim().is_empty() {
        return config.preamble.text.clone();
    }
    format!(
        "### Repo: {}\n### Total Chunks: {}\n\nBelow are the extracted chunks from the repo for your analysis.\n",
        repo_name, total_chunks
    )
}

pub fn resolve_postamble(config: &Config) -> String {
    if !config.postamble.text.trim().is_empty() {
        return config.postamble.text.clone();
    }
    "---\nEnd of chunks. Please analyze accordingly.\n".to_string()
}

/// Wraps the first chunk with the preamble and the last with the postamble.
/// Nothing happens for an empty sequence; no other chunk is touched.
pub fn wrap_with_preamble(chunks: &mut [Chunk], preamble: &str, postamble: &str) {
    let Some(first) = chunks.first_mut() else {
        log::debug!("No chunks to wrap with preamble/postamble.");
        return;
    };
    first.content = format!(
        "{}\n{}\n{}\n\n{}",
        PREAMBLE_START,
        preamble.trim(),
        PREAMBLE_END,
        first.content
    );

    if let Some(last) = chunks.last_mut() {
        last.content = format!(
            "{}\n\n{}\n{}\n{}",
            last.content.trim_end(),
            POSTAMBLE_START,
            postamble.trim(),
            POSTAMBLE_END
        );
    }
}
