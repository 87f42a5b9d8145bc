use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "scholaris", version, about = "Scholaris: what was last, what is now, what comes next")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the situation at an instant
    Situation(commands::situation::SituationArgs),
    /// Show a day's ordered schedule
    Schedule(commands::schedule::ScheduleArgs),
    /// Keep printing the situation as it changes
    Watch(commands::watch::WatchArgs),
    /// Day cache management
    Cache {
        #[command(subcommand)]
        action: commands::cache::CacheAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Log to stderr, filtered by `SCHOLARIS_LOG`, then `RUST_LOG`, then `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("SCHOLARIS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Situation(args) => commands::situation::run(args),
        Commands::Schedule(args) => commands::schedule::run(args),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Cache { action } => commands::cache::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
