use anyhow::Result;
use clap::Parser;
use codepad_ai::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    codepad_ai::run(args).await
}
