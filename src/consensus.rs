//! Consensus synthesis.
//!
//! Combines the strategist's explicit decision with all personas'
//! extracted leans. Strategist wins, votes corroborate: the tally is
//! informational only and never overrides the strategist's action,
//! even when it disagrees.

use crate::models::{
    ConsensusTally, Lean, MarketMode, Persona, PersonaResult, PersonaVote, SignalAction,
    UnifiedSignal,
};
use crate::signal;

/// Tallies directional votes over all successful persona results.
///
/// Agreement is `round(max(bullish, bearish) / total x 100)`, 0 when
/// there are no votes.
pub fn tally(responses: &[PersonaResult]) -> ConsensusTally {
    let votes: Vec<PersonaVote> = responses
        .iter()
        .map(|r| {
            let sig = signal::classify(&r.content);
            PersonaVote {
                persona: r.persona,
                lean: sig.lean,
                confidence: sig.confidence,
            }
        })
        .collect();

    let bullish_count = votes.iter().filter(|v| v.lean == Lean::Bullish).count();
    let bearish_count = votes.iter().filter(|v| v.lean == Lean::Bearish).count();
    let total_votes = votes.len();

    let agreement_pct = if total_votes > 0 {
        ((bullish_count.max(bearish_count) as f64 / total_votes as f64) * 100.0).round() as u8
    } else {
        0
    };

    ConsensusTally {
        bullish_count,
        bearish_count,
        total_votes,
        agreement_pct,
        votes,
    }
}

/// Builds the unified signal from the strategist's response.
///
/// `None` when no strategist result is present. The action maps straight
/// from the strategist's extracted lean; confidence is the first
/// percentage in its text; the summary is opaque display text.
pub fn unified_signal(
    responses: &[PersonaResult],
    responded: usize,
    queried: usize,
    mode: MarketMode,
) -> Option<UnifiedSignal> {
    let strategist = responses.iter().find(|r| r.persona == Persona::Strategist)?;
    let sig = signal::classify(&strategist.content);

    let action = match sig.lean {
        Lean::Bullish => SignalAction::Buy,
        Lean::Bearish => SignalAction::Sell,
        Lean::Neutral => SignalAction::Hold,
    };

    Some(UnifiedSignal {
        action,
        confidence: sig.confidence,
        summary: format!(
            "Based on {}/{} node responses. Mode: {}",
            responded,
            queried,
            mode.as_upper()
        ),
    })
}
