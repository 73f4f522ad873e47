// Calibration Classifier
// Nearest-reference verdict against user-supplied human / AI sample profiles

use crate::models::{ClassificationLabel, ClassificationResult, FeatureVector, ReferenceProfile};

use super::features::clamp01;

/// Margin magnitude treated as fully confident; larger margins saturate at 1.
pub const CONFIDENCE_SCALE: f64 = 0.25;
/// Margins smaller than this are reported as uncertain regardless of sign.
pub const UNCERTAINTY_BAND: f64 = 0.06;

pub const NOTE_MISSING: &str =
    "Calibration incomplete: save both a human and an AI sample to compare against.";
pub const NOTE_UNCERTAIN: &str = "Close to both profiles; no clear lean either way.";
const NOTE_HUMAN: &str =
    "Closer to your human sample profile. This is a proximity signal, not proof.";
const NOTE_AI: &str = "Closer to your AI sample profile. This is a proximity signal, not proof.";

/// Euclidean distance over the five feature components.
pub fn euclidean_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.components()
        .iter()
        .zip(b.components().iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Classify a document's features by proximity to the two reference profiles.
///
/// Pure: the result depends only on the three arguments.
pub fn classify(
    features: &FeatureVector,
    human: Option<&ReferenceProfile>,
    ai: Option<&ReferenceProfile>,
) -> ClassificationResult {
    let (Some(human), Some(ai)) = (human, ai) else {
        return ClassificationResult {
            label: ClassificationLabel::Uncertain,
            confidence: 0.0,
            distance_to_human: None,
            distance_to_ai: None,
            note: NOTE_MISSING.to_string(),
        };
    };

    let distance_to_human = euclidean_distance(features, &human.features);
    let distance_to_ai = euclidean_distance(features, &ai.features);

    // Positive margin means the probe sits closer to the human reference.
    let margin = distance_to_ai - distance_to_human;
    let confidence = clamp01(margin.abs() / CONFIDENCE_SCALE);

    let (label, note) = if margin.abs() < UNCERTAINTY_BAND {
        (ClassificationLabel::Uncertain, NOTE_UNCERTAIN)
    } else if margin > 0.0 {
        (ClassificationLabel::Human, NOTE_HUMAN)
    } else {
        (ClassificationLabel::Ai, NOTE_AI)
    };

    ClassificationResult {
        label,
        confidence,
        distance_to_human: Some(distance_to_human),
        distance_to_ai: Some(distance_to_ai),
        note: note.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileLabel;
    use chrono::Utc;

    fn fv(v: f64) -> FeatureVector {
        FeatureVector {
            avg_repetition: v,
            avg_vocab_diversity: v,
            generic_rate: v,
            transition_rate: v,
            uniformity: v,
        }
    }

    fn profile(label: ProfileLabel, features: FeatureVector) -> ReferenceProfile {
        ReferenceProfile {
            label,
            features,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_distance() {
        let a = FeatureVector::default();
        let mut b = FeatureVector::default();
        b.avg_repetition = 0.3;
        b.uniformity = 0.4;
        assert!((euclidean_distance(&a, &b) - 0.5).abs() < 1e-12);
        assert_eq!(euclidean_distance(&b, &b), 0.0);
    }

    #[test]
    fn test_missing_profiles_are_uncertain() {
        let h = profile(ProfileLabel::Human, fv(0.1));
        let a = profile(ProfileLabel::Ai, fv(0.9));
        for result in [
            classify(&fv(0.2), None, Some(&a)),
            classify(&fv(0.2), Some(&h), None),
            classify(&fv(0.2), None, None),
        ] {
            assert_eq!(result.label, ClassificationLabel::Uncertain);
            assert_eq!(result.confidence, 0.0);
            assert!(result.distance_to_human.is_none());
            assert!(result.distance_to_ai.is_none());
            assert_eq!(result.note, NOTE_MISSING);
        }
    }

    #[test]
    fn test_closer_to_human() {
        let h = profile(ProfileLabel::Human, fv(0.1));
        let a = profile(ProfileLabel::Ai, fv(0.9));
        let result = classify(&fv(0.2), Some(&h), Some(&a));
        assert_eq!(result.label, ClassificationLabel::Human);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_swap_flips_label_keeps_confidence() {
        let h = profile(ProfileLabel::Human, fv(0.30));
        let a = profile(ProfileLabel::Ai, fv(0.35));
        let probe = fv(0.25);
        let r1 = classify(&probe, Some(&h), Some(&a));
        let r2 = classify(&probe, Some(&a), Some(&h));
        assert_eq!(r1.label, ClassificationLabel::Human);
        assert_eq!(r2.label, ClassificationLabel::Ai);
        assert!((r1.confidence - r2.confidence).abs() < 1e-12);
        assert!(r1.confidence > 0.0 && r1.confidence < 1.0);
    }

    #[test]
    fn test_uncertainty_band() {
        // Distances differ by sqrt(5) * 0.02 ~= 0.045 < 0.06.
        let h = profile(ProfileLabel::Human, fv(0.50));
        let a = profile(ProfileLabel::Ai, fv(0.52));
        let result = classify(&fv(0.40), Some(&h), Some(&a));
        assert_eq!(result.label, ClassificationLabel::Uncertain);
        assert_eq!(result.note, NOTE_UNCERTAIN);
        assert!(result.distance_to_human.is_some());
    }
}
