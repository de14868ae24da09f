//! Greedy IoU non-maximum suppression.

use crate::detection::Detection;
use crate::trace::{trace_event, trace_span};

/// Which detections may suppress each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NmsMode {
    /// Any overlapping detection suppresses, regardless of class.
    #[default]
    ClassAgnostic,
    /// Only detections of the same class suppress each other.
    PerClass,
}

/// Sorts detections by descending confidence; equal scores keep their order.
pub(crate) fn sort_by_confidence_desc(detections: &mut [Detection]) {
    detections.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));
}

/// Applies greedy non-maximum suppression.
///
/// Detections are sorted by descending confidence, then each one is kept if
/// its IoU with every previously kept detection (of the same class under
/// [`NmsMode::PerClass`]) is at most `iou_threshold`. The kept detections are
/// returned in descending confidence order.
pub fn nms(detections: &mut [Detection], iou_threshold: f32, mode: NmsMode) -> Vec<Detection> {
    let _span = trace_span!("nms", candidates = detections.len()).entered();

    sort_by_confidence_desc(detections);
    let mut kept: Vec<Detection> = Vec::new();

    'outer: for det in detections.iter() {
        for prev in kept.iter() {
            if mode == NmsMode::PerClass && prev.class_id() != det.class_id() {
                continue;
            }
            if prev.iou(det) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(*det);
    }

    trace_event!("nms_kept", kept = kept.len());
    kept
}

#[cfg(test)]
mod tests {
    use super::{nms, NmsMode};
    use crate::detection::{BoundingBox, CoordSpace, Detection};

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, class_id: usize, conf: f32) -> Detection {
        Detection::new(
            BoundingBox::from_corners(x1, y1, x2, y2, CoordSpace::Normalized),
            class_id,
            conf,
        )
    }

    #[test]
    fn overlapping_lower_score_is_dropped() {
        let mut dets = vec![
            det(0.0, 0.0, 1.0, 1.0, 0, 0.6),
            det(0.0, 0.0, 1.0, 0.95, 0, 0.8),
        ];
        let kept = nms(&mut dets, 0.5, NmsMode::ClassAgnostic);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].confidence() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn per_class_mode_keeps_other_classes() {
        let mut dets = vec![
            det(0.0, 0.0, 1.0, 1.0, 0, 0.9),
            det(0.0, 0.0, 1.0, 1.0, 1, 0.7),
        ];
        assert_eq!(nms(&mut dets.clone(), 0.5, NmsMode::PerClass).len(), 2);
        assert_eq!(nms(&mut dets, 0.5, NmsMode::ClassAgnostic).len(), 1);
    }

    #[test]
    fn iou_equal_to_threshold_survives() {
        // IoU of these two boxes is exactly 0.5.
        let mut dets = vec![
            det(0.0, 0.0, 2.0, 1.0, 0, 0.9),
            det(0.0, 0.0, 1.0, 1.0, 0, 0.8),
        ];
        assert_eq!(nms(&mut dets, 0.5, NmsMode::ClassAgnostic).len(), 2);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let mut dets = vec![
            det(0.0, 0.0, 1.0, 1.0, 3, 0.5),
            det(0.0, 0.0, 1.0, 1.0, 7, 0.5),
        ];
        let kept = nms(&mut dets, 0.5, NmsMode::ClassAgnostic);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].class_id(), 3);
    }
}
