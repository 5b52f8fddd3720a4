use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tally_finance::ClassificationSession;
use tally_ingest::{read_corpus, read_training};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod repl;
mod state;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Interactive bank-transaction categoriser")]
struct Cli {
    /// Config file (default: ~/.tally/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a training set and one or more corpus files, then start the
    /// interactive categorisation loop
    Run {
        /// Labelled transactions: date;...;amount;category
        training: PathBuf,

        /// Transactions to categorise: date;...;amount
        #[arg(required = true)]
        corpus: Vec<PathBuf>,
    },

    /// Write the default configuration file
    InitConfig,

    /// Print the effective configuration
    ShowConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { training, corpus } => {
            run_session(cli.config, training, corpus)?;
        }

        Command::InitConfig => {
            config::init_config(cli.config.as_deref())?;
        }

        Command::ShowConfig => {
            let path = config::config_path(cli.config.as_deref())?;
            let cfg = config::load_config(&path)?;
            println!("# {}", path.display());
            print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
        }
    }

    Ok(())
}

fn run_session(config: Option<PathBuf>, training: PathBuf, corpus: Vec<PathBuf>) -> Result<()> {
    let cfg = config::load_config(&config::config_path(config.as_deref())?)?;
    let opts = cfg.read_options();

    if !training.exists() {
        bail!("training set not found: {}", training.display());
    }
    let examples = read_training(&training, opts)
        .with_context(|| format!("parsing {}", training.display()))?;

    let mut items = Vec::new();
    for path in &corpus {
        let txns = read_corpus(path, opts).with_context(|| format!("parsing {}", path.display()))?;
        info!(path = %path.display(), records = txns.len(), "loaded corpus file");
        items.extend(txns);
    }

    println!(
        "Loaded {} training examples from {} and {} transactions from {} file(s)",
        examples.len(),
        training.display(),
        items.len(),
        corpus.len()
    );

    let mut session = ClassificationSession::new(examples, items, &cfg.session_settings())
        .context("building classification session")?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    repl::run(&mut session, stdin.lock(), &mut stdout)
}
