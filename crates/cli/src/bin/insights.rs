use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    insights_cli::main_entry().await
}
