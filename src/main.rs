#[tokio::main]
async fn main() -> anyhow::Result<()> {
    zkc_sequencer::server::run().await
}
