//! Sample classification: rescale, sort, bucket, tally, majority.
//!
//! Everything in this module is pure and synchronous. Raw bytes come in from
//! whatever acquired them; a [`ClassificationResult`] goes out.
//!
//! ```text
//! raw u8 → rescale into [min, max] → sort desc → z-score bucket → tally → majority
//! ```
//!
//! # Reference scale
//!
//! Buckets are assigned against a fixed reference scale (mean 50, standard
//! deviation 17), NOT against the request bounds. A request for `[0, 1000]`
//! will therefore label almost everything `VeryPositive`. This matches the
//! long-standing behaviour of the oracle and is kept deliberately.

use serde::{Deserialize, Serialize};

/// Upper bound of a raw sample. Rescaling divides by this.
pub const RAW_MAX: u8 = 255;

/// Mean of the fixed reference scale used for bucketing.
pub const REFERENCE_MEAN: f64 = 50.0;

/// Standard deviation of the fixed reference scale used for bucketing.
pub const REFERENCE_STD_DEV: f64 = 17.0;

/// Samples per reading when the caller does not say otherwise.
pub const DEFAULT_COUNT: usize = 3;
/// Default lower bound of the rescaled range.
pub const DEFAULT_MIN: i64 = 0;
/// Default upper bound of the rescaled range.
pub const DEFAULT_MAX: i64 = 100;

// ---------------------------------------------------------------------------
// Buckets and groups
// ---------------------------------------------------------------------------

/// Five-level ordinal sentiment bucket. Declaration order is the total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

impl Bucket {
    /// All buckets, lowest first.
    pub const ALL: [Bucket; 5] = [
        Bucket::VeryNegative,
        Bucket::Negative,
        Bucket::Neutral,
        Bucket::Positive,
        Bucket::VeryPositive,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::VeryNegative => "Very Negative",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Positive => "Positive",
            Self::VeryPositive => "Very Positive",
        }
    }

    /// Position in [`Bucket::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Coarse group this bucket folds into.
    pub fn group(self) -> CoarseGroup {
        match self {
            Self::VeryNegative | Self::Negative => CoarseGroup::Negative,
            Self::Neutral => CoarseGroup::Neutral,
            Self::Positive | Self::VeryPositive => CoarseGroup::Positive,
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Three-way grouping of [`Bucket`]s used for the majority vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoarseGroup {
    Negative,
    Neutral,
    Positive,
}

impl CoarseGroup {
    pub fn label(self) -> &'static str {
        match self {
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Positive => "Positive",
        }
    }
}

impl std::fmt::Display for CoarseGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Scalar operations
// ---------------------------------------------------------------------------

/// Linearly rescale a raw byte into `[min_value, max_value]`.
///
/// Equivalent to `floor((raw / 255) * (max_value - min_value) + min_value)`,
/// evaluated exactly in integer arithmetic so `rescale(r, 0, 255) == r`.
///
/// When `max_value < min_value` the mapping runs backwards (255 lands on
/// `max_value`, 0 on `min_value`). Callers that care must validate the bounds;
/// this function never fails.
pub fn rescale(raw: u8, min_value: i64, max_value: i64) -> i64 {
    let span = i128::from(max_value) - i128::from(min_value);
    let scaled = (i128::from(raw) * span).div_euclid(i128::from(RAW_MAX));
    (scaled + i128::from(min_value)) as i64
}

/// z-score of `value` on the fixed reference scale.
pub fn z_score(value: i64) -> f64 {
    (value as f64 - REFERENCE_MEAN) / REFERENCE_STD_DEV
}

/// Bucket a rescaled value. First matching threshold wins.
pub fn classify(value: i64) -> Bucket {
    let z = z_score(value);
    if z <= -1.5 {
        Bucket::VeryNegative
    } else if z <= -0.5 {
        Bucket::Negative
    } else if z <= 0.5 {
        Bucket::Neutral
    } else if z <= 1.5 {
        Bucket::Positive
    } else {
        Bucket::VeryPositive
    }
}

// ---------------------------------------------------------------------------
// Tallies
// ---------------------------------------------------------------------------

/// Occurrence count per [`Bucket`], indexed by [`Bucket::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketHistogram {
    pub counts: [usize; 5],
}

impl BucketHistogram {
    pub fn from_buckets(buckets: &[Bucket]) -> Self {
        let mut counts = [0usize; 5];
        for b in buckets {
            counts[b.index()] += 1;
        }
        Self { counts }
    }

    pub fn count(&self, bucket: Bucket) -> usize {
        self.counts[bucket.index()]
    }

    /// Fold five buckets into three groups.
    pub fn fold(&self) -> GroupTally {
        GroupTally {
            negative: self.count(Bucket::VeryNegative) + self.count(Bucket::Negative),
            neutral: self.count(Bucket::Neutral),
            positive: self.count(Bucket::Positive) + self.count(Bucket::VeryPositive),
        }
    }
}

/// Counts per [`CoarseGroup`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTally {
    pub negative: usize,
    pub neutral: usize,
    pub positive: usize,
}

impl GroupTally {
    pub fn count(&self, group: CoarseGroup) -> usize {
        match group {
            CoarseGroup::Negative => self.negative,
            CoarseGroup::Neutral => self.neutral,
            CoarseGroup::Positive => self.positive,
        }
    }

    /// The group whose count strictly exceeds both others.
    ///
    /// Any tie at the top (two-way or three-way, including all zero) yields
    /// `Neutral`.
    pub fn majority(&self) -> CoarseGroup {
        let (n, z, p) = (self.negative, self.neutral, self.positive);
        if n > z && n > p {
            CoarseGroup::Negative
        } else if p > n && p > z {
            CoarseGroup::Positive
        } else {
            CoarseGroup::Neutral
        }
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Outcome of classifying one batch of raw samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Lower bound the samples were rescaled into.
    pub min_value: i64,
    /// Upper bound the samples were rescaled into.
    pub max_value: i64,
    /// Rescaled samples, sorted descending. Equal values carry no order guarantee.
    pub samples: Vec<i64>,
    /// `buckets[i]` is the bucket of `samples[i]`.
    pub buckets: Vec<Bucket>,
    pub histogram: BucketHistogram,
    pub tally: GroupTally,
    pub majority: CoarseGroup,
}

impl ClassificationResult {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `(value, bucket)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, Bucket)> + '_ {
        self.samples.iter().copied().zip(self.buckets.iter().copied())
    }

    /// Position of `value` inside `[min_value, max_value]`, clamped to `[0, 1]`.
    ///
    /// A degenerate range (`min == max`) reports a full bar.
    pub fn proportion(&self, value: i64) -> f64 {
        let span = self.max_value as f64 - self.min_value as f64;
        if span == 0.0 {
            return 1.0;
        }
        ((value as f64 - self.min_value as f64) / span).clamp(0.0, 1.0)
    }
}

/// Classify a batch of raw samples rescaled into `[min_value, max_value]`.
///
/// The descending sort is unstable; equal values may come out in any order.
/// An empty batch yields empty sequences and a `Neutral` majority.
pub fn classify_batch(raw: &[u8], min_value: i64, max_value: i64) -> ClassificationResult {
    let mut samples: Vec<i64> = raw
        .iter()
        .map(|&r| rescale(r, min_value, max_value))
        .collect();
    samples.sort_unstable_by(|a, b| b.cmp(a));

    let buckets: Vec<Bucket> = samples.iter().map(|&v| classify(v)).collect();
    let histogram = BucketHistogram::from_buckets(&buckets);
    let tally = histogram.fold();
    let majority = tally.majority();

    log::debug!(
        "classified {} samples in [{min_value}, {max_value}]: -{} ={} +{} -> {majority}",
        samples.len(),
        tally.negative,
        tally.neutral,
        tally.positive,
    );

    ClassificationResult {
        min_value,
        max_value,
        samples,
        buckets,
        histogram,
        tally,
        majority,
    }
}

/// Immutable parameters for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    /// Number of raw samples to acquire.
    pub count: usize,
    pub min_value: i64,
    pub max_value: i64,
}

impl Default for ClassificationRequest {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            min_value: DEFAULT_MIN,
            max_value: DEFAULT_MAX,
        }
    }
}

impl ClassificationRequest {
    pub fn new(count: usize, min_value: i64, max_value: i64) -> Self {
        Self {
            count,
            min_value,
            max_value,
        }
    }

    /// Whether the bounds are ordered. The classifier does not check this.
    pub fn has_ordered_bounds(&self) -> bool {
        self.min_value <= self.max_value
    }

    /// Classify `raw` with this request's bounds.
    pub fn run(&self, raw: &[u8]) -> ClassificationResult {
        classify_batch(raw, self.min_value, self.max_value)
    }
}
