use anyhow::Context;
use fixwide_vectors::{VectorConfig, VectorSet, Width};
use sha2::{Digest, Sha256};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Generates the default vector set for every width, checks it, and prints one
// digest per width over its JSON lines. Optional first argument: a JSON
// config, e.g. '{"seed": 7, "radices": [2, 10]}'.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config: VectorConfig = match std::env::args().nth(1) {
        Some(json) => serde_json::from_str(&json).context("parsing vector config")?,
        None => VectorConfig::default(),
    };
    tracing::info!(
        seed = config.seed,
        count = config.count,
        radices = ?config.radices,
        "generating"
    );

    for width in Width::ALL {
        let set = VectorSet::generate(&config, width)?;
        let verified = set.verify()?;

        let mut hasher = Sha256::new();
        for vector in &set.vectors {
            hasher.update(serde_json::to_vec(vector)?);
            hasher.update(b"\n");
        }
        println!(
            "{:?} ({} bits) {} vectors {}",
            width,
            width.bits(),
            verified,
            hex::encode(hasher.finalize())
        );
    }
    Ok(())
}
