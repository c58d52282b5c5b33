//! Submission screening heuristics
//!
//! Fixed-constant pattern checks over the signals the plugin collects while
//! the visitor fills the form. Deliberately not adaptive; thresholds changed
//! only with plugin releases.

use serde::{Deserialize, Serialize};

/// A human takes longer than this to fill any real form
pub const MIN_FILL_TIME_MS: i64 = 2_000;

/// Variance check needs at least this many keystroke gaps to mean anything
pub const MIN_KEYSTROKES_FOR_VARIANCE: usize = 8;

/// Keystroke gap variance below this (ms²) with no mouse movement reads as
/// scripted input
pub const GAP_VARIANCE_FLOOR_MS2: f64 = 4.0;

/// What tripped the block, as stored in telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockMethod {
    Honeypot,
    Timestamp,
    Token,
    Behavior,
}

impl BlockMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Honeypot => "honeypot",
            Self::Timestamp => "timestamp",
            Self::Token => "token",
            Self::Behavior => "behavior",
        }
    }
}

/// Signals the plugin reports alongside a submission
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionSignals {
    /// Value of the hidden honeypot field (humans never fill it)
    #[serde(default)]
    pub honeypot_value: String,
    /// When the form was rendered (ms, client clock)
    pub rendered_at_ms: i64,
    /// When the form was submitted (ms, same clock)
    pub submitted_at_ms: i64,
    /// Mouse movement events seen while the form was open
    #[serde(default)]
    pub mouse_moves: u32,
    /// Gaps between consecutive keystrokes, in ms
    #[serde(default)]
    pub keystroke_gaps_ms: Vec<f64>,
}

/// Screening verdict
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Verdict {
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<BlockMethod>,
}

impl Verdict {
    fn pass() -> Self {
        Self {
            blocked: false,
            method: None,
        }
    }

    fn block(method: BlockMethod) -> Self {
        Self {
            blocked: true,
            method: Some(method),
        }
    }
}

/// Evaluate the signals. Checks run cheapest-first; the first hit wins.
pub fn evaluate(signals: &SubmissionSignals) -> Verdict {
    if !signals.honeypot_value.trim().is_empty() {
        return Verdict::block(BlockMethod::Honeypot);
    }

    let fill_time = signals.submitted_at_ms - signals.rendered_at_ms;
    if fill_time < MIN_FILL_TIME_MS {
        return Verdict::block(BlockMethod::Timestamp);
    }

    // Scripted input: perfectly regular keystrokes and no mouse at all
    if signals.mouse_moves == 0
        && signals.keystroke_gaps_ms.len() >= MIN_KEYSTROKES_FOR_VARIANCE
        && variance(&signals.keystroke_gaps_ms) < GAP_VARIANCE_FLOOR_MS2
    {
        return Verdict::block(BlockMethod::Behavior);
    }

    Verdict::pass()
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn human_signals() -> SubmissionSignals {
        SubmissionSignals {
            honeypot_value: String::new(),
            rendered_at_ms: 0,
            submitted_at_ms: 15_000,
            mouse_moves: 42,
            keystroke_gaps_ms: vec![120.0, 80.0, 200.0, 95.0, 140.0, 60.0, 180.0, 110.0],
        }
    }

    #[test]
    fn test_human_passes() {
        let v = evaluate(&human_signals());
        assert!(!v.blocked);
        assert!(v.method.is_none());
    }

    #[test]
    fn test_filled_honeypot_blocks() {
        let mut s = human_signals();
        s.honeypot_value = "http://spam.example".into();
        let v = evaluate(&s);
        assert!(v.blocked);
        assert_eq!(v.method, Some(BlockMethod::Honeypot));
    }

    #[test]
    fn test_under_two_seconds_blocks() {
        let mut s = human_signals();
        s.submitted_at_ms = s.rendered_at_ms + 1_999;
        assert_eq!(evaluate(&s).method, Some(BlockMethod::Timestamp));

        // exactly at the threshold passes
        s.submitted_at_ms = s.rendered_at_ms + 2_000;
        assert!(!evaluate(&s).blocked);
    }

    #[test]
    fn test_scripted_typing_blocks() {
        let mut s = human_signals();
        s.mouse_moves = 0;
        s.keystroke_gaps_ms = vec![50.0; 12];
        assert_eq!(evaluate(&s).method, Some(BlockMethod::Behavior));
    }

    #[test]
    fn test_regular_typing_with_mouse_passes() {
        let mut s = human_signals();
        s.mouse_moves = 3;
        s.keystroke_gaps_ms = vec![50.0; 12];
        assert!(!evaluate(&s).blocked);
    }

    #[test]
    fn test_few_keystrokes_do_not_trigger_variance_check() {
        let mut s = human_signals();
        s.mouse_moves = 0;
        s.keystroke_gaps_ms = vec![50.0; 4];
        assert!(!evaluate(&s).blocked);
    }

    #[test]
    fn test_variance() {
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(variance(&[5.0, 5.0, 5.0]), 0.0);
        assert!(variance(&[10.0, 200.0, 40.0]) > GAP_VARIANCE_FLOOR_MS2);
    }
}
