use anyhow::Result;
use chunky_core::AppError;
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io;

use crate::cli_args::{Cli, CompletionArgs};

pub fn handle_completion_command(args: &CompletionArgs) -> Result<()> {
    let shell_str = args.shell.as_deref().unwrap_or("bash");
    let shell_enum = parse_shell(shell_str)?;

    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    generate(shell_enum, &mut command, bin_name, &mut io::stdout());
    Ok(())
}

fn parse_shell(shell_str: &str) -> Result<Shell> {
    match shell_str.to_lowercase().as_str() {
        "fish" => Ok(Shell::Fish),
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        _ => anyhow::bail!(AppError::InvalidArgument(format!(
            "Unsupported shell for completion: {}",
            shell_str
        ))),
    }
}
