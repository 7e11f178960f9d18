use fixwide_math::Fixed256;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Runs a fixed chain of Fixed256 operations and prints a SHA-256 over the
// resulting limbs. Any two machines must print the same digest.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut values = Vec::new();
    let mut x: Fixed256 = "0.5".parse()?;
    for i in 1..=64 {
        let step = Fixed256::from_int(i).try_div(Fixed256::from_int(i + 3))?;
        x = (x * step + Fixed256::ONE).sqrt()?;
        values.push(x);
        values.push(-x / Fixed256::from_f64(1.25));
    }

    let mut bytes = Vec::with_capacity(values.len() * 32);
    for v in &values {
        for limb in v.to_bits().as_slice() {
            bytes.extend_from_slice(&limb.to_le_bytes());
        }
    }
    println!("FIXED256_HASH {}", sha256(&bytes));
    println!("LAST {}", values[values.len() - 2]);
    Ok(())
}

fn sha256(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
