#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ticktick_mcp::run().await
}
