use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        visible_alias = "project-root",
        help = "Local directory to chunk (default: $PROJECT_ROOT or current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub local_path: Option<PathBuf>,

    #[arg(
        long,
        help = "Ignore the .chunkyconfig file in the project root.",
        help_heading = "Project Setup"
    )]
    pub no_config: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ChunkingOpts {
    #[arg(
        long,
        help = "Approximate max tokens per chunk [default: 3000].",
        value_name = "TOKENS",
        help_heading = "Chunking"
    )]
    pub chunk_size: Option<usize>,

    #[arg(
        long,
        help = "Max lines per chunk before token splitting [default: chunk size].",
        value_name = "LINES",
        help_heading = "Chunking"
    )]
    pub max_lines: Option<usize>,

    #[arg(
        long,
        help = "Strip comments from code before chunking.",
        help_heading = "Chunking"
    )]
    pub no_comments: bool,

    #[arg(
        long,
        help = "Comma-separated glob patterns to include (default: all).",
        value_name = "GLOBS",
        help_heading = "Chunking"
    )]
    pub include_globs: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "chunky",
    author,
    version,
    about = "Split a source tree into token-bounded chunks for AI analysis.",
    long_about = "chunky walks a project directory, filters files with .chunkyignore and include globs, \noptionally strips comments, and splits file contents into line- and token-bounded chunks \nwrapped with a preamble and postamble.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  chunky generate --local-path ./repo -f md\n  chunky generate --include-globs '*.go,src/**/*.go' --no-comments\n  chunky stats --local-path ./repo",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Chunk the project and write the chunks."
    )]
    Generate(GenerateArgs),

    #[command(
        visible_alias = "m",
        about = "Show per-file line, size and token statistics."
    )]
    Stats(StatsArgs),

    #[command(
        visible_alias = "d",
        about = "Show effective configuration and selected files."
    )]
    Debug(DebugArgs),

    #[command(about = "Generate shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub chunking: ChunkingOpts,

    #[arg(short = 'f', long, help = "Set the output format [default: txt].", value_name = "FORMAT", value_parser = ["txt", "md", "json"], help_heading = "Output Control")]
    pub format: Option<String>,

    #[arg(
        short = 'o',
        long,
        help = "Directory for per-chunk files [default: chunk_output].",
        value_name = "DIR",
        help_heading = "Output Control"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        long,
        help = "Only print the combined output; skip writing chunk files.",
        help_heading = "Output Control"
    )]
    pub no_save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub chunking: ChunkingOpts,
    #[arg(long, help = "Print statistics as JSON instead of a table.")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DebugArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub chunking: ChunkingOpts,
    #[arg(long, help = "Print debug information as JSON.")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Shell to generate completions for (fish, bash, zsh) [default: bash]"
    )]
    pub shell: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_with_overrides() {
        let cli = Cli::try_parse_from([
            "chunky",
            "-vv",
            "gen",
            "--local-path",
            "/tmp/repo",
            "--chunk-size",
            "500",
            "--include-globs",
            "*.go,*.rs",
            "--no-comments",
            "-f",
            "md",
            "--no-save",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Generate(args)) => {
                assert_eq!(args.project_config.local_path, Some(PathBuf::from("/tmp/repo")));
                assert_eq!(args.chunking.chunk_size, Some(500));
                assert_eq!(args.chunking.include_globs.as_deref(), Some("*.go,*.rs"));
                assert!(args.chunking.no_comments);
                assert_eq!(args.format.as_deref(), Some("md"));
                assert!(args.no_save);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["chunky", "generate", "-f", "xml"]).is_err());
    }

    #[test]
    fn rejects_non_numeric_chunk_size() {
        assert!(Cli::try_parse_from(["chunky", "generate", "--chunk-size", "lots"]).is_err());
    }
}
