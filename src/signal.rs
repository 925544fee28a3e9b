//! Free-text signal extraction.
//!
//! A pure heuristic classifier turning model output into a directional
//! lean plus a confidence percentage. One implementation, two call sites:
//! the orchestrator uses it for the strategist's unified signal and the
//! consensus tally uses it for per-persona votes.
//!
//! Precedence is fixed: bullish markers are checked before bearish ones,
//! so mixed-sentiment text always resolves bullish. That is a known
//! heuristic weakness kept deliberately - disambiguating by marker count
//! or position would change live behavior.

use crate::models::Lean;

/// Markers checked first. Any match wins immediately.
const BULLISH_MARKERS: [&str; 6] = [
    "BULLISH",
    "GO — LONG",
    "GO —LONG",
    "GO - LONG",
    "BUY",
    "LONG ENTRY",
];

/// Checked only when no bullish marker matched.
const BEARISH_MARKERS: [&str; 4] = ["BEARISH", "NO GO", "SHORT", "SELL"];

/// Default confidence when the text carries no percentage token.
const DEFAULT_CONFIDENCE: u8 = 50;

/// A classified piece of free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedSignal {
    pub lean: Lean,
    /// First percentage found in the text, clamped to 0-100, default 50.
    pub confidence: u8,
}

/// Classifies free text into a directional lean and confidence.
///
/// Pure function: identical input always yields an identical result.
pub fn classify(text: &str) -> ExtractedSignal {
    let upper = text.to_uppercase();

    let lean = if BULLISH_MARKERS.iter().any(|m| upper.contains(m)) {
        Lean::Bullish
    } else if BEARISH_MARKERS.iter().any(|m| upper.contains(m)) {
        Lean::Bearish
    } else {
        Lean::Neutral
    };

    ExtractedSignal {
        lean,
        confidence: extract_confidence(text),
    }
}

/// Finds the first percentage-shaped token (`\d{1,3}%`): up to three digits
/// immediately preceding the first `%` that has any digit before it.
fn extract_confidence(text: &str) -> u8 {
    let bytes = text.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        if b != b'%' {
            continue;
        }
        // Walk back over at most three digits.
        let mut start = i;
        while start > 0 && i - start < 3 && bytes[start - 1].is_ascii_digit() {
            start -= 1;
        }
        if start == i {
            continue; // '%' with no digits in front, keep scanning
        }
        let value: u32 = text[start..i].parse().unwrap_or(0);
        return value.min(100) as u8;
    }

    DEFAULT_CONFIDENCE
}
