use anyhow::Result;
use doorman::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
