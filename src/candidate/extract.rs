//! Per-prediction decoding: scoring, class selection and box conversion.

use crate::decode::{DecodeConfig, ScoringMode};
use crate::detection::{BoundingBox, CoordSpace, Detection};
use crate::tensor::TensorView;
use crate::util::math::argmax;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Offset of the first class score within a prediction.
pub(crate) const CLASS_OFFSET: usize = 5;

/// Decodes prediction `pred`, or returns `None` if it is filtered out.
///
/// The caller guarantees the tensor has `5 + num_classes` attributes.
pub(crate) fn decode_prediction(
    tensor: TensorView<'_>,
    cfg: &DecodeConfig,
    pred: usize,
) -> Option<Detection> {
    let layout = cfg.layout;
    let at = |attr: usize| tensor.attribute(layout, pred, attr);

    let objectness = at(4);
    let (class_id, class_score) =
        argmax((0..cfg.num_classes).map(|k| at(CLASS_OFFSET + k)))?;
    let confidence = match cfg.scoring {
        ScoringMode::ObjectnessTimesClass => objectness * class_score,
        ScoringMode::ObjectnessOnly => objectness,
    };
    // NaN must not pass the threshold.
    if !(confidence >= cfg.confidence_threshold) {
        return None;
    }
    if cfg.target_class.is_some_and(|target| target != class_id) {
        return None;
    }

    let (cx, cy, w, h) = (at(0), at(1), at(2), at(3));
    if !(cx.is_finite() && cy.is_finite() && w.is_finite() && h.is_finite()) {
        return None;
    }
    let bbox = BoundingBox::from_center(cx, cy, w, h, CoordSpace::Normalized)
        .to_space(cfg.output_space);
    Some(Detection::new(bbox, class_id, confidence))
}

/// Decodes every prediction and keeps those that pass threshold and class
/// filters, in prediction order.
pub(crate) fn extract_candidates(tensor: TensorView<'_>, cfg: &DecodeConfig) -> Vec<Detection> {
    let n = tensor.num_predictions(cfg.layout);

    #[cfg(feature = "rayon")]
    if cfg.parallel {
        return (0..n)
            .into_par_iter()
            .filter_map(|pred| decode_prediction(tensor, cfg, pred))
            .collect();
    }

    (0..n)
        .filter_map(|pred| decode_prediction(tensor, cfg, pred))
        .collect()
}
