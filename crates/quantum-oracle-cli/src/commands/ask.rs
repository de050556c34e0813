use anyhow::ensure;

use quantum_oracle_core::{ClassificationRequest, OsSource, Reading, read_keyed, read_local};

use super::ApiArgs;
use crate::render::render_reading;

pub struct AskCommandConfig<'a> {
    pub request: ClassificationRequest,
    pub secret: Option<&'a str>,
    pub offline: bool,
    pub json: bool,
    pub api: &'a ApiArgs,
}

pub fn run(cfg: AskCommandConfig<'_>) -> anyhow::Result<()> {
    super::validate_request(&cfg.request)?;
    let reading = take_reading(&cfg)?;

    if cfg.json {
        println!("{}", serde_json::to_string_pretty(&reading)?);
    } else {
        print!("{}", render_reading(&reading));
    }
    Ok(())
}

fn take_reading(cfg: &AskCommandConfig<'_>) -> anyhow::Result<Reading> {
    if cfg.offline {
        log::debug!("offline: using the OS random generator");
        return Ok(read_local(&OsSource, cfg.request)?);
    }

    ensure!(
        cfg.api.has_key(),
        "no API key configured: set QRNG_API_KEY (or pass --api-key), or use --offline"
    );
    let client = cfg.api.client()?;
    let chain = cfg.api.chain();
    Ok(read_keyed(&client, &chain, cfg.request, cfg.secret)?)
}
