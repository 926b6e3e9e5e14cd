use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    excavator_cli::cli::app::run().await
}
