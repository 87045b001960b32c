use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Mirror starred snippet gists into a local cache and keep an index of them.
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "SHELF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync now, then again on every interval until interrupted
    Run,
    /// Run a single sync cycle and print what it did
    Sync,
    /// Rebuild the index from the cache alone, without touching the network
    Index {
        /// Print the whole index as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["shelf", "index", "--json", "-vv", "--config", "shelf.yaml"]);
        assert!(matches!(cli.command, Command::Index { json: true }));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("shelf.yaml")));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["shelf", "-q", "-v", "sync"]).is_err());
    }
}
