use anyhow::Result;
use clap::Parser;
use granat_bot::{init_tracing, run_bot, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_bot(cli).await
}
