//! Raw sample sources.
//!
//! A source hands back raw bytes and nothing else. Keyed sources (remote APIs)
//! take a [`Credential`] per call so the acquisition layer can walk a fallback
//! list; unkeyed sources (the local OS CSPRNG) do not.

use crate::acquisition::Credential;

/// Why a source could not deliver samples.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Connection, TLS or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-success HTTP status.
    #[error("upstream returned HTTP {code}: {message}")]
    Status { code: u16, message: String },
    /// The upstream answered but reported `success: false`.
    #[error("upstream rejected the request: {0}")]
    Rejected(String),
    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Fewer samples than requested came back.
    #[error("short read: expected {expected} samples, got {got}")]
    ShortRead { expected: usize, got: usize },
    /// Request length outside what the source accepts.
    #[error("invalid length {requested}: must be between 1 and {max}")]
    InvalidLength { requested: usize, max: usize },
    /// The OS random number generator failed.
    #[error("OS random generator failed: {0}")]
    Os(String),
}

/// A source of raw samples that needs no credential.
pub trait RandomSource: Send + Sync {
    /// Short identifier used in logs and readings.
    fn name(&self) -> &str;

    /// Fetch exactly `count` raw samples.
    fn fetch(&self, count: usize) -> Result<Vec<u8>, SourceError>;
}

/// A source of raw samples that authenticates each request.
pub trait KeyedSource: Send + Sync {
    /// Short identifier used in logs and readings.
    fn name(&self) -> &str;

    /// Fetch exactly `count` raw samples using `credential`.
    fn fetch_with(&self, credential: &Credential, count: usize) -> Result<Vec<u8>, SourceError>;
}

/// Local OS CSPRNG. Not quantum, but always available for offline readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSource;

impl RandomSource for OsSource {
    fn name(&self) -> &str {
        "os"
    }

    fn fetch(&self, count: usize) -> Result<Vec<u8>, SourceError> {
        let mut buf = vec![0u8; count];
        getrandom::fill(&mut buf).map_err(|e| SourceError::Os(e.to_string()))?;
        Ok(buf)
    }
}

/// Check that a source returned what was asked for.
pub fn expect_len(samples: Vec<u8>, expected: usize) -> Result<Vec<u8>, SourceError> {
    if samples.len() != expected {
        return Err(SourceError::ShortRead {
            expected,
            got: samples.len(),
        });
    }
    Ok(samples)
}
