use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hopwatch_core::{Config, Dialect};

#[derive(Parser)]
#[command(name = "hopwatch", about = "hopwatch — periodic mtr captures as canonical JSON")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Probe the configured destinations forever (the default).
    Run {
        /// TOML file layered between the built-in defaults and MTR_* variables.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Run a single cycle and exit.
        #[arg(long)]
        once: bool,
    },
    /// Normalize a saved mtr capture and print it to stdout.
    Normalize {
        file: PathBuf,
        /// Destination the capture was taken for; reported in logs when it differs.
        #[arg(long, default_value = "unknown")]
        destination: String,
        /// `legacy` or `json`; guessed from the contents when omitted.
        #[arg(long)]
        dialect: Option<Dialect>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command.unwrap_or(Command::Run {
        config: None,
        once: false,
    }) {
        Command::Run { config, once } => {
            let config = Config::load(config.as_deref())?;
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(hopwatch::run(config, once))
        }
        Command::Normalize {
            file,
            destination,
            dialect,
        } => {
            let rendered = hopwatch::normalize_file(&file, &destination, dialect)?;
            println!("{rendered}");
            Ok(())
        }
    }
}
