use snafu::prelude::*;

use crate::config::*;
use crate::topsis::rank_by_topsis;

/// Fixed TOPSIS weights for detection labels: confidence, then severity.
pub const LABEL_WEIGHTS: [f64; 2] = [0.6, 0.4];

/// A damage label returned by the image classifier.
#[derive(PartialEq, Debug, Clone)]
pub struct DetectionLabel {
    pub label: String,
    /// In [0, 1]
    pub confidence: f64,
    /// Damage severity on the 1-5 scale.
    pub severity: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct LabelRanking {
    pub label: String,
    pub score: f64,
    pub rank: u32,
}

/// Orders the labels of a report, most relevant first.
pub fn rank_detection_labels(labels: &[DetectionLabel]) -> PriorityResult<Vec<LabelRanking>> {
    if labels.is_empty() {
        return Ok(Vec::new());
    }
    for l in labels.iter() {
        ensure!(
            (0.0..=1.0).contains(&l.confidence),
            InvalidInputSnafu {
                reason: format!("confidence of {:?} out of [0, 1]: {}", l.label, l.confidence)
            }
        );
        ensure!(
            l.severity.is_finite() && l.severity >= 0.0,
            InvalidInputSnafu {
                reason: format!("negative severity for {:?}: {}", l.label, l.severity)
            }
        );
    }
    let decision: Vec<Vec<f64>> = labels
        .iter()
        .map(|l| vec![l.confidence, l.severity])
        .collect();
    let mut res: Vec<LabelRanking> = rank_by_topsis(&decision, &LABEL_WEIGHTS)?
        .iter()
        .map(|ts| LabelRanking {
            label: labels[ts.alternative].label.clone(),
            score: ts.score,
            rank: ts.rank,
        })
        .collect();
    res.sort_by_key(|r| r.rank);
    Ok(res)
}
