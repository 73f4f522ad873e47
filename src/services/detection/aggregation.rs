// Aggregation Logic
// Aggregates sentence scores into the document result

use crate::models::{DocumentResult, FeatureVector, SentenceScore};

use super::features::clamp01;
use super::scoring::REASON_FALLBACK;

/// Threshold used when the caller supplies none (or an unusable one).
pub const DEFAULT_THRESHOLD: f64 = 0.35;
/// Share of the overall score carried by the mean sentence score.
const AVG_SCORE_WEIGHT: f64 = 0.65;
/// Share carried by the fraction of flagged sentences.
const FLAGGED_RATIO_WEIGHT: f64 = 0.35;

/// Non-finite thresholds fall back to the default; finite ones are clamped to [0, 1].
pub fn sanitize_threshold(threshold: f64) -> f64 {
    if threshold.is_finite() {
        threshold.clamp(0.0, 1.0)
    } else {
        DEFAULT_THRESHOLD
    }
}

/// Aggregate sentence scores into a document result.
///
/// Blends average intensity with breadth: `0.65 * mean + 0.35 * flagged_ratio`.
/// The feature vector is the per-component sentence mean. Changing `threshold`
/// only changes which sentences are flagged, never the feature math.
pub fn aggregate(scores: &[SentenceScore], threshold: f64) -> DocumentResult {
    let threshold = sanitize_threshold(threshold);

    if scores.is_empty() {
        return DocumentResult {
            overall_score: 0.0,
            threshold,
            avg_sentence_length: 0.0,
            sentence_count: 0,
            features: FeatureVector::default(),
            flagged_sentences: Vec::new(),
        };
    }

    let n = scores.len() as f64;
    let avg_score = scores.iter().map(|s| s.score).sum::<f64>() / n;

    let flagged_sentences: Vec<SentenceScore> = scores
        .iter()
        .filter(|s| s.score >= threshold)
        .cloned()
        .map(|mut s| {
            if s.reasons.is_empty() {
                s.reasons.push(REASON_FALLBACK.to_string());
            }
            s
        })
        .collect();
    let flagged_ratio = flagged_sentences.len() as f64 / n;

    let overall_score = clamp01(AVG_SCORE_WEIGHT * avg_score + FLAGGED_RATIO_WEIGHT * flagged_ratio);

    let mean = |f: fn(&SentenceScore) -> f64| clamp01(scores.iter().map(f).sum::<f64>() / n);
    let features = FeatureVector {
        avg_repetition: mean(|s| s.raw_subfeatures.rep),
        avg_vocab_diversity: mean(|s| s.raw_subfeatures.vocab_diversity),
        generic_rate: mean(|s| s.raw_subfeatures.generic_flag),
        transition_rate: mean(|s| s.raw_subfeatures.transition_density),
        uniformity: mean(|s| s.raw_subfeatures.length_uniformity),
    };

    let avg_sentence_length = scores.iter().map(|s| s.span.char_len()).sum::<usize>() as f64 / n;

    DocumentResult {
        overall_score,
        threshold,
        avg_sentence_length,
        sentence_count: scores.len(),
        features,
        flagged_sentences,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SentenceFeatures, SentenceSpan};

    fn scored(text: &str, score: f64, reasons: &[&str], f: SentenceFeatures) -> SentenceScore {
        SentenceScore {
            span: SentenceSpan {
                text: text.to_string(),
                start: 0,
                end: text.len(),
            },
            score,
            reasons: reasons.iter().map(|r| r.to_string()).collect(),
            raw_subfeatures: f,
        }
    }

    #[test]
    fn test_aggregate_empty() {
        let result = aggregate(&[], DEFAULT_THRESHOLD);
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(result.sentence_count, 0);
        assert_eq!(result.features, FeatureVector::default());
        assert!(result.flagged_sentences.is_empty());
    }

    #[test]
    fn test_aggregate_blend_and_means() {
        let a = SentenceFeatures {
            rep: 0.2,
            vocab_diversity: 0.8,
            generic_flag: 1.0,
            transition_density: 0.5,
            length_uniformity: 1.0,
        };
        let b = SentenceFeatures {
            rep: 0.0,
            vocab_diversity: 1.0,
            generic_flag: 0.0,
            transition_density: 0.0,
            length_uniformity: 0.5,
        };
        let scores = vec![scored("abcd", 0.6, &["x"], a), scored("ab", 0.2, &[], b)];
        let result = aggregate(&scores, 0.35);

        let expected = 0.65 * 0.4 + 0.35 * 0.5;
        assert!((result.overall_score - expected).abs() < 1e-12);
        assert_eq!(result.sentence_count, 2);
        assert_eq!(result.flagged_sentences.len(), 1);
        assert!((result.avg_sentence_length - 3.0).abs() < 1e-12);
        assert!((result.features.avg_repetition - 0.1).abs() < 1e-12);
        assert!((result.features.generic_rate - 0.5).abs() < 1e-12);
        assert!((result.features.uniformity - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_flagged_sentence_gets_fallback_reason() {
        let scores = vec![scored("abc", 0.5, &[], SentenceFeatures::default())];
        let result = aggregate(&scores, 0.35);
        assert_eq!(result.flagged_sentences[0].reasons, vec![REASON_FALLBACK]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let scores = vec![scored("abc", 0.35, &["x"], SentenceFeatures::default())];
        assert_eq!(aggregate(&scores, 0.35).flagged_sentences.len(), 1);
        assert_eq!(aggregate(&scores, 0.36).flagged_sentences.len(), 0);
    }

    #[test]
    fn test_sanitize_threshold() {
        assert_eq!(sanitize_threshold(f64::NAN), DEFAULT_THRESHOLD);
        assert_eq!(sanitize_threshold(f64::INFINITY), DEFAULT_THRESHOLD);
        assert_eq!(sanitize_threshold(1.7), 1.0);
        assert_eq!(sanitize_threshold(-0.2), 0.0);
        assert_eq!(sanitize_threshold(0.5), 0.5);
    }
}
