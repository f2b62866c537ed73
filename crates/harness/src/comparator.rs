//! Golden vs. hardware comparison
//!
//! A test passes when the attack flags are equal and both scores are within
//! `tolerance` raw units of the golden value. The tolerance is always chosen
//! by the caller. Differences are taken in `i64`, so opposite-sign extremes
//! of a 32-bit register do not overflow.
//!
//! Trace entries that name a test the golden reference does not have are
//! reported as warnings and skipped; they never fail the batch.

use serde::{Deserialize, Serialize};
use std::fmt;

use fxpca_kernel::ScoreResult;

use crate::trace::TraceEntry;

/// Per-field outcome of comparing one golden result with one observed result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComparisonOutcome {
    pub attack_match: bool,
    pub major_diff: u64,
    pub minor_diff: u64,
    pub major_match: bool,
    pub minor_match: bool,
}

impl ComparisonOutcome {
    pub fn passed(&self) -> bool {
        self.attack_match && self.major_match && self.minor_match
    }
}

fn abs_diff(a: i32, b: i32) -> u64 {
    (i64::from(a) - i64::from(b)).unsigned_abs()
}

/// Compare one observed result against its golden result
pub fn compare(golden: &ScoreResult, observed: &ScoreResult, tolerance: u64) -> ComparisonOutcome {
    let major_diff = abs_diff(golden.major_score, observed.major_score);
    let minor_diff = abs_diff(golden.minor_score, observed.minor_score);
    ComparisonOutcome {
        attack_match: golden.attack_detected == observed.attack_detected,
        major_diff,
        minor_diff,
        major_match: major_diff <= tolerance,
        minor_match: minor_diff <= tolerance,
    }
}

/// How trace test ids map onto golden positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexBase {
    Zero,
    /// Testbenches number tests from 1
    #[default]
    One,
}

impl IndexBase {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "0" | "zero" => Some(Self::Zero),
            "1" | "one" => Some(Self::One),
            _ => None,
        }
    }

    /// Golden position for a test id, `None` for id 0 under one-based numbering
    pub fn position(self, test_id: usize) -> Option<usize> {
        match self {
            Self::Zero => Some(test_id),
            Self::One => test_id.checked_sub(1),
        }
    }
}

/// A failing test, with both sides kept for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub test_id: usize,
    pub golden: ScoreResult,
    pub observed: ScoreResult,
    pub outcome: ComparisonOutcome,
}

/// Non-fatal problems found while pairing results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceWarning {
    IndexOutOfRange { test_id: usize, golden_len: usize },
}

impl fmt::Display for TraceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { test_id, golden_len } => write!(
                f,
                "test {} has no golden result ({} golden samples), skipped",
                test_id, golden_len
            ),
        }
    }
}

/// Aggregate result of comparing a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub pass_count: usize,
    pub fail_count: usize,
    pub mismatches: Vec<Mismatch>,
    pub warnings: Vec<TraceWarning>,
}

impl BatchOutcome {
    /// Number of tests actually compared
    pub fn total(&self) -> usize {
        self.pass_count + self.fail_count
    }

    pub fn all_passed(&self) -> bool {
        self.fail_count == 0
    }

    /// At least one test compared and none failed
    pub fn passed(&self) -> bool {
        self.total() > 0 && self.all_passed()
    }

    fn record(&mut self, test_id: usize, golden: &ScoreResult, observed: &ScoreResult, tolerance: u64) {
        let outcome = compare(golden, observed, tolerance);
        if outcome.passed() {
            self.pass_count += 1;
        } else {
            self.fail_count += 1;
            self.mismatches.push(Mismatch {
                test_id,
                golden: *golden,
                observed: *observed,
                outcome,
            });
        }
    }

    fn skip(&mut self, test_id: usize, golden_len: usize) {
        let warning = TraceWarning::IndexOutOfRange { test_id, golden_len };
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Compare results paired by position. Observed results past the end of
/// `goldens` are skipped with a warning; the test id is the position.
pub fn compare_all(goldens: &[ScoreResult], observeds: &[ScoreResult], tolerance: u64) -> BatchOutcome {
    let mut batch = BatchOutcome::default();
    for (i, observed) in observeds.iter().enumerate() {
        match goldens.get(i) {
            Some(golden) => batch.record(i, golden, observed, tolerance),
            None => batch.skip(i, goldens.len()),
        }
    }
    batch
}

/// Compare a hardware trace against golden results, pairing by test id
pub fn compare_trace(
    goldens: &[ScoreResult],
    entries: &[TraceEntry],
    tolerance: u64,
    index_base: IndexBase,
    total_bits: u8,
) -> BatchOutcome {
    let mut batch = BatchOutcome::default();
    for entry in entries {
        match index_base.position(entry.test_id).and_then(|i| goldens.get(i)) {
            Some(golden) => batch.record(
                entry.test_id,
                golden,
                &entry.to_score_result(total_bits),
                tolerance,
            ),
            None => batch.skip(entry.test_id, goldens.len()),
        }
    }

    tracing::info!(
        compared = batch.total(),
        passed = batch.pass_count,
        failed = batch.fail_count,
        skipped = batch.warnings.len(),
        "Compared hardware trace"
    );
    batch
}

/// Human- and machine-readable summary of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub tolerance: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate_percent: f64,
    /// The first `max_listed` mismatches
    pub mismatches: Vec<Mismatch>,
    pub omitted_mismatches: usize,
    pub warnings: Vec<TraceWarning>,
}

impl ComparisonReport {
    pub fn from_batch(batch: &BatchOutcome, tolerance: u64, max_listed: usize) -> Self {
        let total = batch.total();
        let pass_rate_percent = if total == 0 {
            0.0
        } else {
            100.0 * batch.pass_count as f64 / total as f64
        };
        let listed: Vec<Mismatch> = batch.mismatches.iter().take(max_listed).copied().collect();
        Self {
            tolerance,
            total,
            passed: batch.pass_count,
            failed: batch.fail_count,
            pass_rate_percent,
            omitted_mismatches: batch.mismatches.len() - listed.len(),
            mismatches: listed,
            warnings: batch.warnings.clone(),
        }
    }

    /// Passing requires at least one compared test and no failures
    pub fn passed(&self) -> bool {
        self.total > 0 && self.failed == 0
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Comparison (tolerance {})", self.tolerance)?;
        writeln!(f, "  Total tests: {}", self.total)?;
        writeln!(f, "  Passed:      {} ({:.1}%)", self.passed, self.pass_rate_percent)?;
        writeln!(f, "  Failed:      {}", self.failed)?;

        for m in &self.mismatches {
            writeln!(f)?;
            writeln!(f, "  Test {}:", m.test_id)?;
            if !m.outcome.attack_match {
                writeln!(
                    f,
                    "    attack: golden={} hardware={}",
                    m.golden.attack_detected as u8, m.observed.attack_detected as u8
                )?;
            }
            if !m.outcome.major_match {
                writeln!(
                    f,
                    "    major:  golden={} hardware={} diff={}",
                    m.golden.major_score, m.observed.major_score, m.outcome.major_diff
                )?;
            }
            if !m.outcome.minor_match {
                writeln!(
                    f,
                    "    minor:  golden={} hardware={} diff={}",
                    m.golden.minor_score, m.observed.minor_score, m.outcome.minor_diff
                )?;
            }
        }
        if self.omitted_mismatches > 0 {
            writeln!(f, "\n  ... and {} more mismatches", self.omitted_mismatches)?;
        }
        for w in &self.warnings {
            writeln!(f, "  warning: {}", w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn r(major: i32, minor: i32, attack: bool) -> ScoreResult {
        ScoreResult::new(major, minor, attack)
    }

    #[test]
    fn test_tolerance_boundary() {
        let golden = r(100, 200, false);
        assert!(compare(&golden, &r(110, 190, false), 10).passed());
        let outcome = compare(&golden, &r(111, 200, false), 10);
        assert!(!outcome.passed());
        assert!(!outcome.major_match);
        assert_eq!(outcome.major_diff, 11);
    }

    #[test]
    fn test_attack_flag_must_match_exactly() {
        let outcome = compare(&r(0, 0, false), &r(0, 0, true), u64::MAX);
        assert!(!outcome.attack_match);
        assert!(!outcome.passed());
    }

    #[test]
    fn test_extreme_difference_does_not_overflow() {
        let outcome = compare(&r(i32::MIN, 0, true), &r(i32::MAX, 0, true), 0);
        assert_eq!(outcome.major_diff, u64::from(u32::MAX));
    }

    #[test]
    fn test_compare_all_counts_and_warnings() {
        let goldens = vec![r(1, 1, false), r(2, 2, false)];
        let observeds = vec![r(1, 1, false), r(5, 2, false), r(0, 0, false)];
        let batch = compare_all(&goldens, &observeds, 0);
        assert_eq!(batch.pass_count, 1);
        assert_eq!(batch.fail_count, 1);
        assert_eq!(batch.mismatches[0].test_id, 1);
        assert_eq!(
            batch.warnings,
            vec![TraceWarning::IndexOutOfRange { test_id: 2, golden_len: 2 }]
        );
    }

    #[test]
    fn test_compare_trace_one_based() {
        let goldens = vec![r(10, 20, false), r(30, 40, true)];
        let entries = vec![
            TraceEntry::new(1, r(10, 20, false)),
            TraceEntry::new(2, r(30, 41, true)),
            TraceEntry::new(0, r(0, 0, false)),
            TraceEntry::new(3, r(0, 0, false)),
        ];
        let batch = compare_trace(&goldens, &entries, 0, IndexBase::One, 32);
        assert_eq!(batch.pass_count, 1);
        assert_eq!(batch.fail_count, 1);
        assert_eq!(batch.mismatches[0].test_id, 2);
        assert_eq!(batch.warnings.len(), 2);
    }

    #[test]
    fn test_compare_trace_zero_based() {
        let goldens = vec![r(10, 20, false)];
        let entries = vec![TraceEntry::new(0, r(10, 20, false))];
        let batch = compare_trace(&goldens, &entries, 0, IndexBase::Zero, 32);
        assert_eq!(batch.pass_count, 1);
        assert!(batch.warnings.is_empty());
    }

    #[test]
    fn test_report_lists_first_mismatches() {
        let goldens = vec![r(0, 0, false); 15];
        let observeds = vec![r(1, 0, false); 15];
        let batch = compare_all(&goldens, &observeds, 0);
        let report = ComparisonReport::from_batch(&batch, 0, 10);
        assert_eq!(report.failed, 15);
        assert_eq!(report.mismatches.len(), 10);
        assert_eq!(report.omitted_mismatches, 5);
        assert_eq!(report.mismatches[0].test_id, 0);
        assert!(report.to_string().contains("and 5 more mismatches"));
        assert!(!report.passed());
    }

    #[test]
    fn test_empty_report_does_not_pass() {
        let report = ComparisonReport::from_batch(&BatchOutcome::default(), 10, 10);
        assert_eq!(report.pass_rate_percent, 0.0);
        assert!(!report.passed());
    }

    #[test]
    fn test_empty_batch_does_not_pass() {
        let empty = BatchOutcome::default();
        assert!(empty.all_passed());
        assert!(!empty.passed());

        let one = compare_all(&[r(1, 2, false)], &[r(1, 2, false)], 0);
        assert!(one.passed());
    }

    #[test]
    fn test_index_base_parse() {
        assert_eq!(IndexBase::from_str("one"), Some(IndexBase::One));
        assert_eq!(IndexBase::from_str("0"), Some(IndexBase::Zero));
        assert_eq!(IndexBase::from_str("two"), None);
        assert_eq!(IndexBase::One.position(0), None);
    }

    proptest! {
        #[test]
        fn prop_compare_is_symmetric(
            a in any::<i32>(), b in any::<i32>(),
            c in any::<i32>(), d in any::<i32>(),
            fa in any::<bool>(), fb in any::<bool>(),
            tol in 0u64..1_000_000,
        ) {
            let x = r(a, c, fa);
            let y = r(b, d, fb);
            prop_assert_eq!(compare(&x, &y, tol), compare(&y, &x, tol));
        }

        #[test]
        fn prop_self_comparison_passes(a in any::<i32>(), b in any::<i32>(), f in any::<bool>()) {
            prop_assert!(compare(&r(a, b, f), &r(a, b, f), 0).passed());
        }
    }
}
