use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = stayhub_server_shared::run().await {
        // Tracing may not be initialized if configuration failed
        eprintln!("marketplace-service failed: {:#}", e);
        tracing::error!(error = %e, "marketplace-service failed");
        return Err(e);
    }
    Ok(())
}
