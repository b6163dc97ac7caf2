use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tally_cli::main_entry().await
}
