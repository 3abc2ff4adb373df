pub mod ask;
pub mod config_cmd;
pub mod history;
pub mod load;
pub mod stats;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "medivoice")]
#[command(version, about = "Voice-enabled health advisor for Ghana")]
pub struct Cli {
    /// Path to medivoice.toml
    #[arg(
        long,
        global = true,
        env = "MEDIVOICE_CONFIG",
        default_value = "medivoice.toml"
    )]
    pub config: PathBuf,

    /// Path to data directory (overrides config file)
    #[arg(long, global = true, env = "MEDIVOICE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve,
    /// Load the knowledge seed file into an empty store
    Load(LoadArgs),
    /// Run one text query through the pipeline and print the response
    Ask(AskArgs),
    /// Show recent conversations
    History(HistoryArgs),
    /// Database statistics
    Stats,
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// JSON seed file (defaults to [knowledge].seed_file)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The health question
    pub text: String,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Number of conversations to show
    #[arg(long, default_value = "20")]
    pub limit: usize,

    /// Only emergencies
    #[arg(long)]
    pub emergencies: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Check medivoice.toml for problems
    Validate,
    /// Print the effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from(["medivoice", "ask", "I have a headache"]).unwrap();
        match cli.command {
            Commands::Ask(args) => assert_eq!(args.text, "I have a headache"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_data_dir_after_subcommand() {
        let cli =
            Cli::try_parse_from(["medivoice", "history", "--limit", "5", "--data-dir", "/tmp/mv"])
                .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/mv")));
        match cli.command {
            Commands::History(args) => {
                assert_eq!(args.limit, 5);
                assert!(!args.emergencies);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
