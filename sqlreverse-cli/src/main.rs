use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "sqlreverse")]
#[command(about = "Reverse-engineer database schemas into source code")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to the first settings.{yml,yaml,json,toml} found)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate sources for the named connections (all when none given)
    Reverse {
        /// Connection keys
        names: Vec<String>,
    },

    /// List the tables of one connection that pass the target filters
    Tables {
        /// Connection key
        name: String,
    },

    /// List the registered output languages
    Languages,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Languages = cli.command {
        init_logging(cli.verbose);
        return commands::languages::run();
    }

    let loaded = commands::load_settings(cli.config.as_deref());
    let debug = loaded.as_ref().map_or(false, |s| s.debug);
    init_logging(cli.verbose || debug);
    let settings = loaded?;

    match cli.command {
        Commands::Reverse { names } => commands::reverse::run(&settings, &names).await,
        Commands::Tables { name } => commands::tables::run(&settings, &name).await,
        Commands::Languages => commands::languages::run(),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
