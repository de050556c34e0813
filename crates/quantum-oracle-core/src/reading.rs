//! One complete reading: acquire raw samples, then classify them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::acquisition::{AcquireError, CredentialChain};
use crate::classifier::{ClassificationRequest, ClassificationResult};
use crate::source::{KeyedSource, RandomSource, SourceError, expect_len};

/// A classified batch together with where its samples came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    /// Name of the source that delivered the raw samples.
    pub source: String,
    /// Label of the credential used, for keyed sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    /// Upstream requests made to get the samples.
    pub attempts: usize,
    pub request: ClassificationRequest,
    /// Raw samples as received, before rescaling and sorting.
    pub raw: Vec<u8>,
    pub result: ClassificationResult,
}

impl Reading {
    /// Classify already-acquired samples.
    pub fn from_samples(
        source: impl Into<String>,
        credential: Option<String>,
        attempts: usize,
        request: ClassificationRequest,
        raw: Vec<u8>,
    ) -> Self {
        let result = request.run(&raw);
        Self {
            id: Uuid::new_v4(),
            source: source.into(),
            credential,
            attempts,
            request,
            raw,
            result,
        }
    }
}

/// Take a reading from a keyed source through a credential chain.
pub fn read_keyed(
    source: &dyn KeyedSource,
    chain: &CredentialChain,
    request: ClassificationRequest,
    secret: Option<&str>,
) -> Result<Reading, AcquireError> {
    let got = chain.acquire(source, request.count, secret)?;
    let reading = Reading::from_samples(
        source.name(),
        Some(got.credential),
        got.attempts,
        request,
        got.samples,
    );
    log::info!(
        "reading {} from {}: majority {}",
        reading.id,
        reading.source,
        reading.result.majority
    );
    Ok(reading)
}

/// Take a reading from an unkeyed source.
pub fn read_local(
    source: &dyn RandomSource,
    request: ClassificationRequest,
) -> Result<Reading, SourceError> {
    let raw = expect_len(source.fetch(request.count)?, request.count)?;
    let reading = Reading::from_samples(source.name(), None, 1, request, raw);
    log::info!(
        "reading {} from {}: majority {}",
        reading.id,
        reading.source,
        reading.result.majority
    );
    Ok(reading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::Credential;
    use crate::classifier::CoarseGroup;
    use crate::source::OsSource;

    struct Constant(u8);

    impl KeyedSource for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn fetch_with(&self, _: &Credential, count: usize) -> Result<Vec<u8>, SourceError> {
            Ok(vec![self.0; count])
        }
    }

    impl RandomSource for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn fetch(&self, count: usize) -> Result<Vec<u8>, SourceError> {
            Ok(vec![self.0; count.saturating_sub(1)])
        }
    }

    #[test]
    fn keyed_reading_carries_provenance() {
        let chain = CredentialChain::from_keys("k", "");
        let r = read_keyed(&Constant(255), &chain, ClassificationRequest::default(), None).unwrap();
        assert_eq!(r.source, "constant");
        assert_eq!(r.credential.as_deref(), Some("primary"));
        assert_eq!(r.attempts, 1);
        assert_eq!(r.raw, vec![255, 255, 255]);
        assert_eq!(r.result.samples, vec![100, 100, 100]);
        assert_eq!(r.result.majority, CoarseGroup::Positive);
    }

    struct OneShort;

    impl KeyedSource for OneShort {
        fn name(&self) -> &str {
            "one-short"
        }

        fn fetch_with(&self, _: &Credential, count: usize) -> Result<Vec<u8>, SourceError> {
            Ok(vec![0; count - 1])
        }
    }

    #[test]
    fn keyed_short_read_is_rejected() {
        let chain = CredentialChain::from_keys("k", "");
        let err = read_keyed(&OneShort, &chain, ClassificationRequest::default(), None).unwrap_err();
        assert_eq!(
            err.cause(),
            &SourceError::ShortRead {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn local_reading_from_os() {
        let req = ClassificationRequest::new(5, -10, 10);
        let r = read_local(&OsSource, req).unwrap();
        assert_eq!(r.raw.len(), 5);
        assert_eq!(r.result.len(), 5);
        assert!(r.credential.is_none());
        assert!(r.result.samples.iter().all(|v| (-10..=10).contains(v)));
    }

    #[test]
    fn local_reading_rejects_short_source() {
        let err = read_local(&Constant(1), ClassificationRequest::default()).unwrap_err();
        assert_eq!(
            err,
            SourceError::ShortRead {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn reading_serializes_without_missing_credential() {
        let r = Reading::from_samples("os", None, 1, ClassificationRequest::default(), vec![0, 128, 255]);
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("credential").is_none());
        assert_eq!(json["result"]["majority"], "neutral");
        assert_eq!(json["result"]["buckets"][0], "very_positive");
        assert_eq!(json["result"]["samples"], serde_json::json!([100, 50, 0]));
    }

    #[test]
    fn reading_ids_are_unique() {
        let a = Reading::from_samples("os", None, 1, ClassificationRequest::default(), vec![1]);
        let b = Reading::from_samples("os", None, 1, ClassificationRequest::default(), vec![1]);
        assert_ne!(a.id, b.id);
    }
}
