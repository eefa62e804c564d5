use anyhow::Result;
use tracing::info;

fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout belongs to the UCI protocol.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    info!("castellan starting");
    castellan_uci::UciEngine::new().run()?;
    Ok(())
}
