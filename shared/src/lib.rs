use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Class order baked into the trained artifacts. Reordering this list
/// silently mislabels every prediction.
pub const CLASS_LABELS: [&str; 4] = ["glioma", "meningioma", "notumor", "pituitary"];

pub const NUM_CLASSES: usize = CLASS_LABELS.len();

/// Label reported when a single-model prediction falls below the
/// uncertainty floor.
pub const UNCERTAIN_LABEL: &str = "uncertain";

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModelFamily {
    Mobilenet,
    Efficientnet,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Verdict {
    Confident,
    LowConfidence,
}

/// One model's answer for one upload. Percentages are rounded to two
/// decimals; `probabilities` keys follow [`CLASS_LABELS`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClassificationReport {
    pub prediction: String,
    pub confidence: f32,
    pub probabilities: BTreeMap<String, f32>,
    pub uncertain: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BestModel {
    pub model: ModelFamily,
    pub prediction: String,
    pub verdict: Verdict,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ComparisonReport {
    /// Both models were too unsure for the upload to be a usable scan.
    Invalid { invalid: bool, message: String },
    Resolved {
        invalid: bool,
        best_model: BestModel,
        mobilenet: ClassificationReport,
        efficientnet: ClassificationReport,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_family_round_trips_through_strings() {
        assert_eq!(ModelFamily::Mobilenet.to_string(), "mobilenet");
        assert_eq!(ModelFamily::Efficientnet.to_string(), "efficientnet");
        assert_eq!(
            "efficientnet".parse::<ModelFamily>().unwrap(),
            ModelFamily::Efficientnet
        );
        assert!("resnet".parse::<ModelFamily>().is_err());
    }

    #[test]
    fn classification_report_serializes_wire_shape() {
        let mut probabilities = BTreeMap::new();
        for (label, pct) in CLASS_LABELS.iter().zip([81.25f32, 10.0, 5.0, 3.75]) {
            probabilities.insert(label.to_string(), pct);
        }
        let report = ClassificationReport {
            prediction: "glioma".into(),
            confidence: 81.25,
            probabilities,
            uncertain: false,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["prediction"], "glioma");
        assert_eq!(value["confidence"], 81.25);
        assert_eq!(value["probabilities"]["notumor"], 5.0);
        assert_eq!(value["uncertain"], false);
    }

    #[test]
    fn invalid_comparison_serializes_short_form() {
        let report = ComparisonReport::Invalid {
            invalid: true,
            message: "Uploaded image is not a valid brain MRI".into(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["invalid"], true);
        assert!(value.get("best_model").is_none());
    }

    #[test]
    fn best_model_serializes_object_form() {
        let best = BestModel {
            model: ModelFamily::Mobilenet,
            prediction: "pituitary".into(),
            verdict: Verdict::Confident,
        };
        let value = serde_json::to_value(&best).unwrap();
        assert_eq!(value["model"], "mobilenet");
        assert_eq!(value["verdict"], "confident");
    }
}
