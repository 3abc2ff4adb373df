use clap::Parser;
use medivoice_server::cli::{self, Cli, Commands};
use medivoice_server::config::MediVoiceConfig;
use medivoice_server::serve;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = MediVoiceConfig::load_or_default(&cli.config);
    if let Some(data_dir) = cli.data_dir {
        config.server.data_dir = data_dir;
    }

    match cli.command {
        Commands::Serve => serve::run(config).await,
        Commands::Load(args) => cli::load::run(args, &config),
        Commands::Ask(args) => cli::ask::run(args, &config).await,
        Commands::History(args) => cli::history::run(args, &config),
        Commands::Stats => cli::stats::run(&config),
        // Reads the file as written, without the --data-dir override.
        Commands::Config(cmd) => cli::config_cmd::run(cmd, &cli.config),
    }
}
