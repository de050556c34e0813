//! Integration tests for quantum-oracle-core.
//!
//! These tests drive the full pipeline through the public API:
//! source → credential chain → raw bytes → classification → reading.

use std::sync::atomic::{AtomicUsize, Ordering};

use quantum_oracle_core::{
    AcquireError, Bucket, ClassificationRequest, CoarseGroup, Credential, CredentialChain,
    DENIAL_MESSAGE, KeyedSource, OsSource, SourceError, classify_batch, read_keyed, read_local,
    rescale,
};

/// Rejects the first `failures` requests, then serves a fixed byte pattern.
struct FlakySource {
    failures: usize,
    calls: AtomicUsize,
    pattern: Vec<u8>,
}

impl KeyedSource for FlakySource {
    fn name(&self) -> &str {
        "flaky"
    }

    fn fetch_with(&self, _credential: &Credential, count: usize) -> Result<Vec<u8>, SourceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            return Err(SourceError::Rejected("quota exceeded".to_string()));
        }
        Ok(self.pattern.iter().copied().cycle().take(count).collect())
    }
}

#[test]
fn rescale_covers_full_byte_range() {
    let values: Vec<i64> = (0..=255u8).map(|r| rescale(r, 0, 255)).collect();
    let expected: Vec<i64> = (0..=255).collect();
    assert_eq!(values, expected);
}

#[test]
fn classify_batch_documented_examples() {
    let r = classify_batch(&[255, 255, 255], 0, 100);
    assert_eq!(r.samples, vec![100, 100, 100]);
    assert_eq!(r.buckets, vec![Bucket::VeryPositive; 3]);
    assert_eq!(r.majority, CoarseGroup::Positive);

    let r = classify_batch(&[0, 128, 255], 0, 100);
    assert_eq!(r.samples, vec![100, 50, 0]);
    assert_eq!(r.majority, CoarseGroup::Neutral);

    let r = classify_batch(&[], 0, 100);
    assert!(r.samples.is_empty() && r.buckets.is_empty());
    assert_eq!(r.majority, CoarseGroup::Neutral);
}

#[test]
fn negative_majority() {
    // 0 and 20 rescale to 0 and 7: both VeryNegative.
    let r = classify_batch(&[0, 20, 200], 0, 100);
    assert_eq!(r.tally.negative, 2);
    assert_eq!(r.majority, CoarseGroup::Negative);
}

#[test]
fn reading_through_fallback_chain() {
    let source = FlakySource {
        failures: 2,
        calls: AtomicUsize::new(0),
        pattern: vec![0, 128, 255],
    };
    let chain = CredentialChain::from_keys("p", "a,b,c").with_unlock_secret("let-me-in");

    let reading = read_keyed(
        &source,
        &chain,
        ClassificationRequest::default(),
        Some("let-me-in"),
    )
    .unwrap();

    assert_eq!(reading.credential.as_deref(), Some("fallback-2"));
    assert_eq!(reading.attempts, 3);
    assert_eq!(reading.result.samples, vec![100, 50, 0]);
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn locked_chain_surfaces_denial_message() {
    let source = FlakySource {
        failures: usize::MAX,
        calls: AtomicUsize::new(0),
        pattern: vec![1],
    };
    let chain = CredentialChain::from_keys("p", "a").with_unlock_secret("let-me-in");

    let err = read_keyed(&source, &chain, ClassificationRequest::default(), None).unwrap_err();
    assert!(matches!(err, AcquireError::Locked { .. }));
    assert_eq!(err.to_string(), DENIAL_MESSAGE);
    assert_eq!(
        err.cause(),
        &SourceError::Rejected("quota exceeded".to_string())
    );
}

#[test]
fn offline_reading_respects_bounds() {
    let req = ClassificationRequest::new(32, 1, 6);
    let reading = read_local(&OsSource, req).unwrap();
    assert_eq!(reading.result.len(), 32);
    assert!(reading.result.samples.iter().all(|v| (1..=6).contains(v)));
    assert!(reading.result.samples.windows(2).all(|w| w[0] >= w[1]));
}
