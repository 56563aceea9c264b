#[tokio::main]
async fn main() -> anyhow::Result<()> {
    zonetrack::run().await
}
