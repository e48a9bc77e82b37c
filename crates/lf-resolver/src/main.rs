//! leaf-finder: identify the plant in one photo and publish the answer.
//!
//! Usage: `leaf-finder [config.toml]`. Run inputs come from the
//! environment (`IMAGE_ID`, `ROW_ID`, `IMAGE_NAME`, `PLANTNET_RESULT`).
//! The resolution text is always printed, even when identification fails.

use tracing_subscriber::EnvFilter;

use lf_resolver::pipeline;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "leaf-finder starting");

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LEAF_FINDER_CONFIG").ok());

    let resolution = pipeline::execute(config_path.as_deref(), |key| std::env::var(key).ok()).await;

    let image_id = std::env::var("IMAGE_ID").unwrap_or_default();
    println!("{resolution}");
    println!("{}", serde_json::to_string(&resolution.to_record(&image_id))?);
    tracing::info!(identified = resolution.is_identified(), "leaf-finder finished");
    Ok(())
}
