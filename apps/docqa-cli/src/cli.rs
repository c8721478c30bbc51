use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "docqa", version, about = "Ask questions about a document", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Index a document and answer questions about it interactively
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path of the document (`~` and `$VAR` are expanded)
    pub path: String,

    /// Chunks retrieved per question (overrides `retrieval.k`)
    #[arg(long)]
    pub k: Option<usize>,

    /// Print the retrieved chunks after each answer
    #[arg(long)]
    pub show_sources: bool,
}
