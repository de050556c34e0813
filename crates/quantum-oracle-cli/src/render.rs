//! Terminal rendering of readings.

use std::fmt::Write;

use quantum_oracle_core::{Bucket, ClassificationResult, Reading};

/// Width of the proportional bar in cells.
pub const BAR_WIDTH: usize = 30;

/// A left-aligned bar of `width` cells, `proportion` of them filled.
pub fn bar(proportion: f64, width: usize) -> String {
    let filled = ((proportion.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let mut out = "█".repeat(filled);
    out.push_str(&" ".repeat(width - filled));
    out
}

/// Values, bars, bucket labels, group counts and the majority.
pub fn render_result(result: &ClassificationResult) -> String {
    let mut out = String::new();
    if result.is_empty() {
        out.push_str("  (no samples)\n");
    }

    let value_width = result
        .samples
        .iter()
        .map(|v| v.to_string().len())
        .max()
        .unwrap_or(1);

    for (value, bucket) in result.iter() {
        let _ = writeln!(
            out,
            "  {value:>value_width$}  {}  {bucket}",
            bar(result.proportion(value), BAR_WIDTH)
        );
    }

    let buckets: Vec<String> = Bucket::ALL
        .iter()
        .map(|&b| format!("{} {}", b.label(), result.histogram.count(b)))
        .collect();
    let _ = writeln!(out, "\n  {}", buckets.join(" · "));

    let t = &result.tally;
    let _ = writeln!(
        out,
        "  Negative {} · Neutral {} · Positive {}",
        t.negative, t.neutral, t.positive
    );
    let _ = writeln!(out, "  Majority: {}", result.majority);
    out
}

/// Header line plus [`render_result`].
pub fn render_reading(reading: &Reading) -> String {
    let r = &reading.result;
    let mut out = format!(
        "Quantum reading: {} samples in [{}, {}] from {}",
        r.len(),
        r.min_value,
        r.max_value,
        reading.source
    );
    if let Some(credential) = &reading.credential {
        let _ = write!(
            out,
            " ({credential} key, {} request{})",
            reading.attempts,
            if reading.attempts == 1 { "" } else { "s" }
        );
    }
    out.push_str("\n\n");
    out.push_str(&render_result(r));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantum_oracle_core::{ClassificationRequest, classify_batch};

    #[test]
    fn bar_fill() {
        assert_eq!(bar(0.0, 4), "    ");
        assert_eq!(bar(0.5, 4), "██  ");
        assert_eq!(bar(1.0, 4), "████");
        assert_eq!(bar(7.0, 4), "████");
        assert_eq!(bar(-1.0, 4), "    ");
    }

    #[test]
    fn result_lines_follow_sorted_order() {
        let text = render_result(&classify_batch(&[0, 128, 255], 0, 100));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].trim_start().starts_with("100"));
        assert!(lines[0].ends_with("Very Positive"));
        assert!(lines[1].trim_start().starts_with("50"));
        assert!(lines[1].ends_with("Neutral"));
        assert!(lines[2].trim_start().starts_with('0'));
        assert!(lines[2].ends_with("Very Negative"));
        assert!(text.contains(
            "Very Negative 1 · Negative 0 · Neutral 1 · Positive 0 · Very Positive 1"
        ));
        assert!(text.contains("\n  Negative 1 · Neutral 1 · Positive 1\n"));
        assert!(text.ends_with("Majority: Neutral\n"));
    }

    #[test]
    fn full_value_gets_full_bar() {
        let text = render_result(&classify_batch(&[255], 0, 100));
        assert!(text.contains(&"█".repeat(BAR_WIDTH)));
    }

    #[test]
    fn empty_result_renders() {
        let text = render_result(&classify_batch(&[], 0, 100));
        assert!(text.contains("(no samples)"));
        assert!(text.contains("Majority: Neutral"));
    }

    #[test]
    fn reading_header_mentions_credential() {
        let reading = Reading::from_samples(
            "anu",
            Some("fallback-1".to_string()),
            2,
            ClassificationRequest::default(),
            vec![255, 255, 255],
        );
        let text = render_reading(&reading);
        assert!(text.starts_with("Quantum reading: 3 samples in [0, 100] from anu"));
        assert!(text.contains("(fallback-1 key, 2 requests)"));
        assert!(text.contains("Majority: Positive"));
    }
}
