use std::io::Write;

use anyhow::Result;
use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `ag completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to `out`.
///
/// # Errors
///
/// Returns an error if flushing `out` fails.
pub fn run_completions(shell: Shell, command: &mut clap::Command, out: &mut dyn Write) -> Result<()> {
    generate(shell, command, "ag", out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bash_script_names_binary_and_subcommands() {
        let mut command = clap::Command::new("ag")
            .subcommand(clap::Command::new("cycles"))
            .subcommand(clap::Command::new("live"));
        let mut out = Vec::new();

        run_completions(Shell::Bash, &mut command, &mut out).expect("generate");

        let script = String::from_utf8(out).expect("utf8");
        assert!(script.contains("_ag()"));
        assert!(script.contains("cycles"));
    }
}
