use std::collections::BTreeMap;

use shared::{
    BestModel, ClassificationReport, ComparisonReport, ModelFamily, Verdict, CLASS_LABELS,
    UNCERTAIN_LABEL,
};

use crate::classify::model::Probabilities;

/// `/compare` only: when both models sit below this floor the upload is
/// judged not to be a usable scan at all.
pub const INVALID_THRESHOLD: f32 = 0.45;
/// `/predict` only: below this floor the reported label is overridden to
/// the uncertain label.
pub const UNCERTAIN_THRESHOLD: f32 = 0.70;
/// `/compare`: the winner must clear this floor for a confident verdict.
pub const ARBITRATION_FLOOR: f32 = 0.50;

pub const INVALID_MESSAGE: &str = "Uploaded image is not a valid brain MRI";

fn as_percent(probability: f32) -> f32 {
    (probability * 10_000.0).round() / 100.0
}

fn probability_map(probs: &Probabilities) -> BTreeMap<String, f32> {
    CLASS_LABELS
        .iter()
        .zip(probs.values())
        .map(|(label, prob)| (label.to_string(), as_percent(*prob)))
        .collect()
}

/// Raw per-model report, as emitted inside `/compare`.
pub fn model_report(probs: &Probabilities) -> ClassificationReport {
    let (index, confidence) = probs.top();
    ClassificationReport {
        prediction: CLASS_LABELS[index].to_string(),
        confidence: as_percent(confidence),
        probabilities: probability_map(probs),
        uncertain: false,
    }
}

/// Single-model report for `/predict`.
pub fn single_report(probs: &Probabilities) -> ClassificationReport {
    let mut report = model_report(probs);
    if probs.confidence() < UNCERTAIN_THRESHOLD {
        report.prediction = UNCERTAIN_LABEL.to_string();
        report.uncertain = true;
    }
    report
}

/// Best-of-two arbitration for `/compare`. Mobilenet wins exact ties.
pub fn compare_reports(
    mobilenet: &Probabilities,
    efficientnet: &Probabilities,
) -> ComparisonReport {
    let mob_conf = mobilenet.confidence();
    let eff_conf = efficientnet.confidence();

    if mob_conf < INVALID_THRESHOLD && eff_conf < INVALID_THRESHOLD {
        return ComparisonReport::Invalid {
            invalid: true,
            message: INVALID_MESSAGE.to_string(),
        };
    }

    let mob_report = model_report(mobilenet);
    let eff_report = model_report(efficientnet);

    let (winner, winner_report, winner_conf) = if mob_conf >= eff_conf {
        (ModelFamily::Mobilenet, &mob_report, mob_conf)
    } else {
        (ModelFamily::Efficientnet, &eff_report, eff_conf)
    };
    let verdict = if winner_conf >= ARBITRATION_FLOOR {
        Verdict::Confident
    } else {
        Verdict::LowConfidence
    };
    let best_model = BestModel {
        model: winner,
        prediction: winner_report.prediction.clone(),
        verdict,
    };

    ComparisonReport::Resolved {
        invalid: false,
        best_model,
        mobilenet: mob_report,
        efficientnet: eff_report,
    }
}
