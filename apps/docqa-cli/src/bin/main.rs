use anyhow::{bail, Context};
use clap::Parser;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use docqa_cli::cli::{Cli, Commands, RunArgs};
use docqa_cli::repl::{self, LoopEnd};
use docqa_core::config::{credential, resolve_with_base, Config, API_KEY_ENV};
use docqa_core::loader::{load_document, TextLoader};
use docqa_models::{get_default_embedder, get_default_generator};
use docqa_rag::{Session, SessionConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Default to warn so log lines do not interleave with the transcript
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => run(args).await,
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let config = Config::load().context("failed to load configuration")?;
    let mut settings = config.settings()?;
    if let Some(k) = args.k {
        settings.retrieval.k = k;
        settings.validate()?;
    }
    let api_key = credential(API_KEY_ENV)?;

    let cwd = std::env::current_dir()?;
    let path = resolve_with_base(&cwd, &args.path);
    if !path.exists() {
        bail!("document not found: {}", path.display());
    }
    let document = load_document(&TextLoader::new(), &path)?;

    let embedder = get_default_embedder(&settings.embedding, &api_key)?;
    let generator = get_default_generator(&settings.generation, &api_key)?;
    let mut session_config = SessionConfig::from_settings(&settings);
    session_config.show_progress = io::stderr().is_terminal();
    let mut session = Session::new(session_config, embedder, generator)?;

    println!("Indexing {} ...", path.display());
    session.build(document).await.context("could not index the document")?;
    info!(chunks = session.chunk_count(), "ready");
    println!("Indexed {} chunks.", session.chunk_count());

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = io::stdout();
    let end = repl::run(&mut session, stdin, &mut stdout, args.show_sources).await?;
    session.close();

    match end {
        LoopEnd::Exit | LoopEnd::EndOfInput => {
            println!("Goodbye!");
            Ok(ExitCode::SUCCESS)
        }
        LoopEnd::Fatal(err) => {
            eprintln!("Fatal error: {}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}
