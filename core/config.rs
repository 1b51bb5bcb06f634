use crate::error::{AppError, Result};
use crate::format::FormatType;
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".chunkyconfig";
pub const IGNORE_FILENAME: &str = ".chunkyignore";
pub const DEFAULT_OUTPUT_DIR: &str = "chunk_output";
pub const DEFAULT_CHUNK_SIZE: usize = 3000;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub preamble: TextSection,
    #[serde(default)]
    pub postamble: TextSection,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct TextSection {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChunkingConfig {
    /// Approximate token budget per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Line budget per chunk; falls back to `chunk_size` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<usize>,
    #[serde(default)]
    pub strip_comments: bool,
    #[serde(default)]
    pub include_globs: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_true")]
    pub save_chunks: bool,
}

fn default_true() -> bool {
    true
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_format() -> String {
    "txt".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_lines: None,
            strip_comments: false,
            include_globs: Vec::new(),
        }
    }
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            output_dir: default_output_dir(),
            save_chunks: default_true(),
        }
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    /// Loads `.chunkyconfig` from the project root. A missing file is not an
    /// error and yields the defaults.
    pub fn load_for_root(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILENAME);
        if !config_path.is_file() {
            log::debug!(
                "No config file found at {}, using defaults.",
                config_path.display()
            );
            return Ok(Config::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        toml::from_str::<Config>(&toml_content).map_err(|e| {
            AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                e
            ))
        })
    }

    pub fn effective_max_lines(&self) -> usize {
        self.chunking.max_lines.unwrap_or(self.chunking.chunk_size)
    }

    pub fn format_type(&self) -> Result<FormatType> {
        self.output.format.parse()
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(AppError::InvalidArgument(
                "chunk size must be positive".to_string(),
            ));
        }
        if self.effective_max_lines() == 0 {
            return Err(AppError::InvalidArgument(
                "max lines must be positive".to_string(),
            ));
        }
        self.format_type()?;
        Ok(())
    }

    pub fn get_effective_repo_name(&self, project_root: &Path) -> String {
        project_root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "repo".to_string())
    }
}

/// Splits a comma-separated glob option into trimmed, non-empty patterns.
pub fn parse_include_globs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_for_root(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.chunking.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.effective_max_lines(), DEFAULT_CHUNK_SIZE);
        assert!(config.output.save_chunks);
    }

    #[test]
    fn loads_preamble_and_chunking_sections() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"
[preamble]
text = "Review this code."

[postamble]
text = "Thanks."

[chunking]
chunk_size = 500
max_lines = 40
strip_comments = true
include_globs = ["*.rs"]

[output]
format = "md"
"#,
        )
        .unwrap();

        let config = Config::load_for_root(dir.path()).unwrap();
        assert_eq!(config.preamble.text, "Review this code.");
        assert_eq!(config.postamble.text, "Thanks.");
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.effective_max_lines(), 40);
        assert!(config.chunking.strip_comments);
        assert_eq!(config.chunking.include_globs, vec!["*.rs".to_string()]);
        assert_eq!(config.format_type().unwrap(), FormatType::Md);
    }

    #[test]
    fn malformed_config_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "[preamble\ntext = 1").unwrap();
        let err = Config::load_for_root(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::TomlParse(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[preamble]\ntext = \"hi\"\ncolour = \"red\"\n",
        )
        .unwrap();
        assert!(Config::load_for_root(dir.path()).is_err());
    }

    #[test]
    fn validate_rejects_zero_budgets_and_bad_format() {
        let mut config = Config::default();
        config.chunking.chunk_size = 0;
        assert!(matches!(
            config.validate(),
            Err(AppError::InvalidArgument(_))
        ));

        let mut config = Config::default();
        config.chunking.max_lines = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.format = "xml".to_string();
        assert!(matches!(
            config.validate(),
            Err(AppError::InvalidArgument(_))
        ));

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn include_globs_are_trimmed_and_split() {
        assert_eq!(
            parse_include_globs(" *.go, src/**/*.rs ,,"),
            vec!["*.go".to_string(), "src/**/*.rs".to_string()]
        );
        assert!(parse_include_globs("").is_empty());
    }
}
