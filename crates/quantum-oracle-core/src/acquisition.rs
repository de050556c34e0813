//! Credential chain: primary key first, secret-gated fallbacks after.
//!
//! The chain is a plain ordered list. [`CredentialChain::acquire`] tries the
//! primary credential; if that fails and the caller presented the configured
//! unlock secret, it walks the fallback credentials in order and stops at the
//! first one that delivers. Nothing here classifies anything.

use crate::source::{KeyedSource, SourceError, expect_len};

/// Message shown to users when no credential could deliver samples.
pub const DENIAL_MESSAGE: &str = "Access denied: no API key was able to deliver quantum numbers.";

/// A named API key. The key itself never appears in `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    label: String,
    key: String,
}

impl Credential {
    pub fn new(label: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            key: key.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Raw key material, for the transport layer only.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("label", &self.label)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// Why acquisition gave up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    /// The primary credential failed and the fallbacks were not unlocked.
    #[error("{}", DENIAL_MESSAGE)]
    Locked { cause: SourceError },
    /// Every credential in the chain failed.
    #[error("{}", DENIAL_MESSAGE)]
    Exhausted { attempts: usize, last: SourceError },
}

impl AcquireError {
    /// The last underlying source failure.
    pub fn cause(&self) -> &SourceError {
        match self {
            Self::Locked { cause } => cause,
            Self::Exhausted { last, .. } => last,
        }
    }
}

/// Samples plus which credential produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub samples: Vec<u8>,
    /// Label of the credential that succeeded.
    pub credential: String,
    /// Number of requests made, including the successful one.
    pub attempts: usize,
}

/// Ordered credentials for a keyed source.
#[derive(Debug, Clone)]
pub struct CredentialChain {
    primary: Credential,
    fallbacks: Vec<Credential>,
    unlock_secret: Option<String>,
}

impl CredentialChain {
    /// A chain with only a primary credential.
    pub fn new(primary: Credential) -> Self {
        Self {
            primary,
            fallbacks: Vec::new(),
            unlock_secret: None,
        }
    }

    /// Append fallback credentials, tried in the order given.
    pub fn with_fallbacks(mut self, fallbacks: impl IntoIterator<Item = Credential>) -> Self {
        self.fallbacks.extend(fallbacks);
        self
    }

    /// Secret callers must present to unlock the fallbacks. Empty strings are ignored.
    pub fn with_unlock_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        self.unlock_secret = if secret.is_empty() { None } else { Some(secret) };
        self
    }

    /// Build a chain from a primary key and a comma-separated fallback list.
    ///
    /// Fallbacks are labelled `fallback-1`, `fallback-2`, … in list order.
    /// Blank entries are skipped.
    pub fn from_keys(primary_key: &str, fallback_keys: &str) -> Self {
        let fallbacks = fallback_keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .enumerate()
            .map(|(i, k)| Credential::new(format!("fallback-{}", i + 1), k));
        Self::new(Credential::new("primary", primary_key)).with_fallbacks(fallbacks)
    }

    pub fn primary(&self) -> &Credential {
        &self.primary
    }

    pub fn fallbacks(&self) -> &[Credential] {
        &self.fallbacks
    }

    /// Whether `secret` unlocks the fallbacks. An unset unlock secret matches nothing.
    pub fn unlocks(&self, secret: Option<&str>) -> bool {
        match (&self.unlock_secret, secret) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        }
    }

    /// Fetch `count` samples from `source`, walking the chain as described above.
    ///
    /// A credential only succeeds if it delivers exactly `count` samples; a
    /// short or oversized batch counts as a failure and the walk continues.
    pub fn acquire(
        &self,
        source: &dyn KeyedSource,
        count: usize,
        secret: Option<&str>,
    ) -> Result<Acquisition, AcquireError> {
        log::info!(
            "requesting {count} samples from {} with {}",
            source.name(),
            self.primary
        );
        let primary_err = match fetch_exact(source, &self.primary, count) {
            Ok(samples) => {
                return Ok(Acquisition {
                    samples,
                    credential: self.primary.label.clone(),
                    attempts: 1,
                });
            }
            Err(e) => e,
        };
        log::warn!("{} failed on {}: {primary_err}", self.primary, source.name());

        if !self.unlocks(secret) {
            log::warn!("fallback credentials locked; giving up");
            return Err(AcquireError::Locked { cause: primary_err });
        }

        let mut attempts = 1;
        let mut last = primary_err;
        for credential in &self.fallbacks {
            attempts += 1;
            log::info!("retrying {} with {credential}", source.name());
            match fetch_exact(source, credential, count) {
                Ok(samples) => {
                    return Ok(Acquisition {
                        samples,
                        credential: credential.label.clone(),
                        attempts,
                    });
                }
                Err(e) => {
                    log::warn!("{credential} failed on {}: {e}", source.name());
                    last = e;
                }
            }
        }

        Err(AcquireError::Exhausted { attempts, last })
    }
}

fn fetch_exact(
    source: &dyn KeyedSource,
    credential: &Credential,
    count: usize,
) -> Result<Vec<u8>, SourceError> {
    expect_len(source.fetch_with(credential, count)?, count)
}
