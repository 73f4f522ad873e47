// Sentence Scoring
// Weighted linear model over sentence sub-features.
//
// The weights and cut-offs below are the whole "model". They are provisional
// calibration values, kept fixed so scores stay comparable across releases.

use crate::models::SentenceFeatures;

use super::features::clamp01;

/// Weight on token repetition, the strongest single signal.
pub const WEIGHT_REPETITION: f64 = 1.25;
/// Weight on lack of vocabulary variety (applied to `1 - vocab_diversity`).
pub const WEIGHT_LOW_DIVERSITY: f64 = 1.10;
/// Weight on sentence-length uniformity.
pub const WEIGHT_UNIFORMITY: f64 = 0.80;
/// Weight on boilerplate phrasing.
pub const WEIGHT_GENERIC: f64 = 0.90;
/// Weight on transition-word density.
pub const WEIGHT_TRANSITION: f64 = 0.70;
/// Divisor applied to the raw weighted sum. It sits below the weight total
/// (4.75), so the strongest sentences saturate at 1 after clamping.
pub const SCORE_NORMALIZER: f64 = 4.5;

pub const REPETITION_REASON_THRESHOLD: f64 = 0.35;
pub const DIVERSITY_REASON_THRESHOLD: f64 = 0.55;
pub const UNIFORMITY_REASON_THRESHOLD: f64 = 0.8;
pub const TRANSITION_REASON_THRESHOLD: f64 = 0.5;

pub const REASON_REPETITION: &str = "Repetitive word patterns";
pub const REASON_LOW_DIVERSITY: &str = "Low vocabulary diversity";
pub const REASON_UNIFORM_LENGTH: &str = "Uniform sentence length";
pub const REASON_GENERIC: &str = "Generic filler phrasing";
pub const REASON_TRANSITIONS: &str = "Heavy use of transition words";
/// Used for flagged sentences where no individual cut-off fired.
pub const REASON_FALLBACK: &str = "pattern-based signal";

/// Score one sentence. Returns the AI-likelihood in [0, 1] and the reasons that fired.
pub fn score(features: &SentenceFeatures) -> (f64, Vec<String>) {
    let raw = WEIGHT_REPETITION * features.rep
        + WEIGHT_LOW_DIVERSITY * (1.0 - features.vocab_diversity)
        + WEIGHT_UNIFORMITY * features.length_uniformity
        + WEIGHT_GENERIC * features.generic_flag
        + WEIGHT_TRANSITION * features.transition_density;

    (clamp01(raw / SCORE_NORMALIZER), reasons(features))
}

fn reasons(features: &SentenceFeatures) -> Vec<String> {
    let mut out = Vec::new();
    if features.rep > REPETITION_REASON_THRESHOLD {
        out.push(REASON_REPETITION.to_string());
    }
    if features.vocab_diversity < DIVERSITY_REASON_THRESHOLD {
        out.push(REASON_LOW_DIVERSITY.to_string());
    }
    if features.length_uniformity > UNIFORMITY_REASON_THRESHOLD {
        out.push(REASON_UNIFORM_LENGTH.to_string());
    }
    if features.generic_flag > 0.0 {
        out.push(REASON_GENERIC.to_string());
    }
    if features.transition_density > TRANSITION_REASON_THRESHOLD {
        out.push(REASON_TRANSITIONS.to_string());
    }
    out
}
