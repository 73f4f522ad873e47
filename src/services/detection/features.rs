// Feature Extraction
// Per-sentence stylistic sub-features, each bounded to [0, 1]

use std::collections::HashSet;

use crate::models::{SentenceFeatures, SentenceSpan};
use crate::services::text_processor::tokenize;

use super::lexicon::Lexicon;

/// Two distinct transition words saturate the transition feature.
const TRANSITION_SATURATION: f64 = 2.0;

#[inline]
pub(crate) fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

/// Mean character length of the spans, 0 when there are none.
pub fn average_sentence_length(spans: &[SentenceSpan]) -> f64 {
    if spans.is_empty() {
        return 0.0;
    }
    spans.iter().map(|s| s.char_len()).sum::<usize>() as f64 / spans.len() as f64
}

/// Compute the sub-features of one sentence against the document's mean sentence length.
pub fn extract(sentence: &str, doc_avg_len: f64, lexicon: &Lexicon) -> SentenceFeatures {
    let tokens = tokenize(sentence);
    let total = tokens.len().max(1) as f64;
    let unique = tokens.iter().collect::<HashSet<_>>().len() as f64;

    let rep = clamp01(1.0 - unique / total);
    let vocab_diversity = clamp01(unique / total);

    let generic_flag = if lexicon.contains_generic_phrase(sentence) { 1.0 } else { 0.0 };

    let transitions = lexicon.distinct_transitions(&tokens) as f64;
    let transition_density = (transitions / TRANSITION_SATURATION).min(1.0);

    let len = sentence.chars().count() as f64;
    let length_uniformity = 1.0 - clamp01((len - doc_avg_len).abs() / doc_avg_len.max(1.0));

    SentenceFeatures {
        rep,
        vocab_diversity,
        generic_flag,
        transition_density,
        length_uniformity: clamp01(length_uniformity),
    }
}
