use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "spl",
    about = "Student Profile Ledger: run profile chaincode locally or behind HTTP",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one chaincode invocation against a local ledger file
    Invoke(InvokeArgs),
    /// Start the HTTP gateway
    Serve(ServeArgs),
    /// Rewrite a ledger file so it holds only live keys
    Compact(CompactArgs),
}

#[derive(Args)]
pub struct InvokeArgs {
    /// Function name, e.g. initProfile or getProfileByID
    pub function: String,
    /// Positional arguments passed to the function
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
    #[arg(long, default_value = "./spl-state.wal")]
    pub state: PathBuf,
    /// Read update subject pairs with `$` as older front ends sent them
    #[arg(long)]
    pub legacy_pairs: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML gateway configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    #[arg(long)]
    pub state: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompactArgs {
    #[arg(long, default_value = "./spl-state.wal")]
    pub state: PathBuf,
}
