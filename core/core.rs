pub mod assemble;
pub mod chunking;
pub mod config;
pub mod error;
pub mod format;
pub mod languages;
pub mod pipeline;
pub mod select;
pub mod strip;
pub mod tokens;

pub use assemble::{resolve_postamble, resolve_preamble, wrap_with_preamble};
pub use chunking::{Chunk, split_into_line_chunks};
pub use config::{Config, parse_include_globs};
pub use error::{AppError, Result};
pub use format::{FormatType, format_chunk_numbered, format_chunks, parse_json_chunks};
pub use pipeline::{
    ChunkRun, PipelineOptions, SkipReason, SkippedFile, build_chunks, chunk_text, generate_chunks,
    is_binary, read_text_file, select_files,
};
pub use select::{SelectedFile, Selector};
pub use strip::strip_comments;
pub use tokens::{estimate_tokens_by_chars, estimate_tokens_by_words, split_by_token_limit};
