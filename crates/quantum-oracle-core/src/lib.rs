//! # quantum-oracle-core
//!
//! **Ask the quantum vacuum a question.**
//!
//! `quantum-oracle-core` turns a handful of raw random bytes (normally from the
//! ANU quantum random number service) into a reading: each byte is rescaled
//! into a caller-chosen range, the values are sorted descending, every value
//! gets one of five sentiment buckets, and the buckets vote on a majority.
//!
//! ## Quick Start
//!
//! ```
//! use quantum_oracle_core::{Bucket, CoarseGroup, classify_batch};
//!
//! let result = classify_batch(&[0, 128, 255], 0, 100);
//! assert_eq!(result.samples, vec![100, 50, 0]);
//! assert_eq!(result.buckets[0], Bucket::VeryPositive);
//! // One vote each: ties resolve to Neutral.
//! assert_eq!(result.majority, CoarseGroup::Neutral);
//! ```
//!
//! ## Architecture
//!
//! Source → Credential chain → Raw bytes → Classifier → Reading
//!
//! - [`classifier`]: pure rescale / bucket / majority logic. No I/O.
//! - [`source`]: the [`RandomSource`] and [`KeyedSource`] traits, plus
//!   [`OsSource`] for offline readings.
//! - [`acquisition`]: [`CredentialChain`], the primary-then-fallback key list.
//! - [`reading`]: glue that acquires and classifies in one call.
//!
//! Network clients live in `quantum-oracle-anu`; this crate never does I/O
//! beyond asking the OS for random bytes.

pub mod acquisition;
pub mod classifier;
pub mod reading;
pub mod source;

pub use acquisition::{AcquireError, Acquisition, Credential, CredentialChain, DENIAL_MESSAGE};
pub use classifier::{
    Bucket, BucketHistogram, ClassificationRequest, ClassificationResult, CoarseGroup,
    DEFAULT_COUNT, DEFAULT_MAX, DEFAULT_MIN, GroupTally, REFERENCE_MEAN, REFERENCE_STD_DEV,
    classify, classify_batch, rescale, z_score,
};
pub use reading::{Reading, read_keyed, read_local};
pub use source::{KeyedSource, OsSource, RandomSource, SourceError};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
