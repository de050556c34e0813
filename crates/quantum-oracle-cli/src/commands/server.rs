use std::sync::Arc;

use anyhow::{Context, ensure};

use quantum_oracle_server::{MAX_READING_LENGTH, OracleState};

use super::ApiArgs;

pub fn run(host: &str, port: u16, api: &ApiArgs) -> anyhow::Result<()> {
    ensure!(
        api.has_key(),
        "no API key configured: set QRNG_API_KEY before starting the server"
    );
    let client = api.client()?;
    let chain = api.chain();
    let n_fallbacks = chain.fallbacks().len();

    let base = format!("http://{host}:{port}");

    println!("🔮 Quantum Oracle Server v{}", quantum_oracle_core::VERSION);
    println!("   {base}");
    println!("   upstream: {}", client.config().api_url);
    println!("   {n_fallbacks} fallback key(s) configured");
    println!();
    println!("   Endpoints:");
    println!("     GET /                 API index (try: curl {base})");
    println!("     GET /api/v1/reading   Acquire, classify and vote");
    println!("     GET /api/v1/classify  Classify supplied bytes");
    println!("     GET /health           Health check");
    println!();
    println!("   Query params for /api/v1/reading:");
    println!("     length=N              Samples to request (1-{MAX_READING_LENGTH}, default: 3)");
    println!("     min=N&max=N           Rescaled range (default: 0-100)");
    println!("     secret=S              Unlock fallback keys");
    println!();
    println!("   Examples:");
    println!("     curl {base}/api/v1/reading");
    println!("     curl '{base}/api/v1/reading?length=5&min=-10&max=10'");
    println!("     curl '{base}/api/v1/classify?data=0,128,255'");
    println!();

    // The blocking client must not be dropped on a runtime thread; keep the
    // last reference out here.
    let client = Arc::new(client);
    let state = OracleState::new(client.clone(), chain);
    let rt = tokio::runtime::Runtime::new().context("cannot start async runtime")?;
    let served = rt.block_on(quantum_oracle_server::run_server(state, host, port));
    drop(rt);
    drop(client);
    served.with_context(|| format!("server on {host}:{port} stopped"))
}
