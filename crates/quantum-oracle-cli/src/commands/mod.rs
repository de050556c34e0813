pub mod ask;
pub mod classify;
pub mod server;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, ensure};
use clap::Args;

use quantum_oracle_anu::{AnuClient, AnuConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, MAX_LENGTH};
use quantum_oracle_core::{ClassificationRequest, CredentialChain, DEFAULT_MAX, DEFAULT_MIN};

/// Upstream API settings, normally taken from the environment or `.env`.
#[derive(Args, Debug, Clone)]
pub struct ApiArgs {
    /// ANU QRNG endpoint
    #[arg(long, env = "QRNG_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Primary API key
    #[arg(long, env = "QRNG_API_KEY", hide_env_values = true, default_value = "")]
    pub api_key: String,

    /// Comma-separated fallback API keys, tried in order once unlocked
    #[arg(long, env = "QRNG_FALLBACK_KEYS", hide_env_values = true, default_value = "")]
    pub fallback_keys: String,

    /// Secret that callers must present to unlock the fallback keys
    #[arg(long, env = "QRNG_UNLOCK_SECRET", hide_env_values = true, default_value = "")]
    pub unlock_secret: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "QRNG_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl ApiArgs {
    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// The ordered credential list for these settings.
    pub fn chain(&self) -> CredentialChain {
        CredentialChain::from_keys(self.api_key.trim(), &self.fallback_keys)
            .with_unlock_secret(self.unlock_secret.clone())
    }

    pub fn client(&self) -> anyhow::Result<AnuClient> {
        let config = AnuConfig::new(self.api_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs.max(1)));
        AnuClient::new(config).context("cannot create ANU client")
    }
}

/// Bounds of the rescaled range.
#[derive(Args, Debug, Clone, Copy)]
pub struct RangeArgs {
    /// Lower bound of the rescaled range
    #[arg(long, default_value_t = DEFAULT_MIN, allow_hyphen_values = true)]
    pub min: i64,

    /// Upper bound of the rescaled range
    #[arg(long, default_value_t = DEFAULT_MAX, allow_hyphen_values = true)]
    pub max: i64,
}

impl RangeArgs {
    pub fn request(&self, count: usize) -> ClassificationRequest {
        ClassificationRequest::new(count, self.min, self.max)
    }
}

/// Reject requests the classifier would accept but that make no sense to a user.
pub fn validate_request(request: &ClassificationRequest) -> anyhow::Result<()> {
    ensure!(
        request.has_ordered_bounds(),
        "--min ({}) must not exceed --max ({})",
        request.min_value,
        request.max_value
    );
    ensure!(
        (1..=MAX_LENGTH).contains(&request.count),
        "sample count must be between 1 and {MAX_LENGTH}, got {}",
        request.count
    );
    Ok(())
}

/// Load `.env`, or the file named by `QRNG_ENV_FILE`.
///
/// A missing `.env` is not an error. A file named explicitly must load.
pub fn load_dotenv() -> anyhow::Result<Option<PathBuf>> {
    let explicit = std::env::var_os("QRNG_ENV_FILE").map(PathBuf::from);
    load_dotenv_from(explicit.as_deref())
}

pub fn load_dotenv_from(path: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    match path {
        Some(p) => {
            dotenvy::from_path(p)
                .with_context(|| format!("cannot load env file {}", p.display()))?;
            Ok(Some(p.to_path_buf()))
        }
        None => Ok(dotenvy::dotenv().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(key: &str, fallbacks: &str, secret: &str) -> ApiArgs {
        ApiArgs {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: key.to_string(),
            fallback_keys: fallbacks.to_string(),
            unlock_secret: secret.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    // -----------------------------------------------------------------------
    // ApiArgs
    // -----------------------------------------------------------------------

    #[test]
    fn chain_from_args() {
        let chain = api(" main ", "b1,b2", "pw").chain();
        assert_eq!(chain.primary().key(), "main");
        assert_eq!(chain.fallbacks().len(), 2);
        assert!(chain.unlocks(Some("pw")));
        assert!(!chain.unlocks(Some("PW")));
    }

    #[test]
    fn empty_unlock_secret_keeps_fallbacks_locked() {
        let chain = api("main", "b1", "").chain();
        assert!(!chain.unlocks(Some("")));
    }

    #[test]
    fn has_key_ignores_whitespace() {
        assert!(!api("  ", "", "").has_key());
        assert!(api("k", "", "").has_key());
    }

    #[test]
    fn client_builds_for_default_url() {
        let client = api("k", "", "").client().unwrap();
        assert_eq!(client.config().api_url, DEFAULT_API_URL);
    }

    #[test]
    fn client_rejects_bad_url() {
        let mut args = api("k", "", "");
        args.api_url = "not-a-url".to_string();
        assert!(args.client().is_err());
    }

    // -----------------------------------------------------------------------
    // validate_request
    // -----------------------------------------------------------------------

    #[test]
    fn validate_accepts_defaults() {
        assert!(validate_request(&ClassificationRequest::default()).is_ok());
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let err = validate_request(&ClassificationRequest::new(3, 5, 1)).unwrap_err();
        assert!(err.to_string().contains("--min (5)"));
    }

    #[test]
    fn validate_rejects_bad_counts() {
        assert!(validate_request(&ClassificationRequest::new(0, 0, 100)).is_err());
        assert!(validate_request(&ClassificationRequest::new(MAX_LENGTH + 1, 0, 100)).is_err());
        assert!(validate_request(&ClassificationRequest::new(MAX_LENGTH, 0, 100)).is_ok());
    }

    // -----------------------------------------------------------------------
    // dotenv
    // -----------------------------------------------------------------------

    #[test]
    fn load_dotenv_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oracle.env");
        std::fs::write(&path, "QRNG_DOTENV_TEST_MARKER=loaded\n").unwrap();

        assert_eq!(load_dotenv_from(Some(path.as_path())).unwrap(), Some(path.clone()));
        assert_eq!(
            std::env::var("QRNG_DOTENV_TEST_MARKER").as_deref(),
            Ok("loaded")
        );
    }

    #[test]
    fn load_dotenv_from_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.env");
        let err = load_dotenv_from(Some(path.as_path())).unwrap_err();
        assert!(format!("{err:#}").contains("absent.env"));
    }
}
