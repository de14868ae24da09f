//! Decoding of YOLO-style detection tensors.
//!
//! A tensor row (or column, see [`Layout`]) holds
//! `[cx, cy, w, h, objectness, class_0 .. class_{K-1}]` in coordinates
//! normalized to the model input. Decoding scores and filters every
//! prediction, converts the survivors to corner boxes in the requested
//! [`CoordSpace`], and removes duplicates with non-maximum suppression.
//!
//! The decoder is stateless. A validated [`Decoder`] can be shared between
//! threads and called concurrently on independent tensors.

use crate::candidate::extract::{extract_candidates, CLASS_OFFSET};
use crate::candidate::nms::{nms, NmsMode};
use crate::detection::{CoordSpace, Detection};
use crate::tensor::{Layout, TensorView};
use crate::trace::{trace_event, trace_span};
use crate::util::math::in_unit_interval;
use crate::util::{DecodeError, DecodeResult};

/// Side length of the square YOLOv5 model input, in pixels.
pub const MODEL_INPUT_SIZE: u32 = 640;
/// Number of predictions a 640x640 YOLOv5 model emits.
pub const YOLOV5_PREDICTIONS: usize = 25_200;
/// Number of classes in the COCO label set.
pub const COCO_CLASSES: usize = 80;
/// COCO class index of "person".
pub const PERSON_CLASS_ID: usize = 0;

/// How the per-prediction confidence is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScoringMode {
    /// `objectness * max_class_score`.
    #[default]
    ObjectnessTimesClass,
    /// `objectness` alone; the class scores only pick the class.
    ObjectnessOnly,
}

/// Configuration for decoding a detection tensor.
#[derive(Clone, Debug)]
pub struct DecodeConfig {
    /// Axis order of the tensor.
    pub layout: Layout,
    /// Number of class scores per prediction.
    pub num_classes: usize,
    /// Minimum confidence for a prediction to be kept, in `[0, 1]`.
    pub confidence_threshold: f32,
    /// IoU above which a lower-confidence detection is suppressed, in `[0, 1]`.
    pub iou_threshold: f32,
    /// Keep only this class when set.
    pub target_class: Option<usize>,
    /// Coordinate space of the emitted boxes.
    pub output_space: CoordSpace,
    /// Confidence formula.
    pub scoring: ScoringMode,
    /// Whether suppression crosses class boundaries.
    pub nms: NmsMode,
    /// Maximum number of detections to return.
    pub max_detections: Option<usize>,
    /// Decode predictions in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            layout: Layout::PredictionMajor,
            num_classes: COCO_CLASSES,
            confidence_threshold: 0.3,
            iou_threshold: 0.45,
            target_class: Some(PERSON_CLASS_ID),
            output_space: CoordSpace::Normalized,
            scoring: ScoringMode::ObjectnessTimesClass,
            nms: NmsMode::ClassAgnostic,
            max_detections: None,
            parallel: false,
        }
    }
}

impl DecodeConfig {
    /// Checks thresholds, class indices and output space.
    pub fn validate(&self) -> DecodeResult<()> {
        if !in_unit_interval(self.confidence_threshold) {
            return Err(DecodeError::InvalidConfig(
                "confidence_threshold must be in [0, 1]",
            ));
        }
        if !in_unit_interval(self.iou_threshold) {
            return Err(DecodeError::InvalidConfig("iou_threshold must be in [0, 1]"));
        }
        if self.num_classes == 0 {
            return Err(DecodeError::InvalidConfig("num_classes must be at least 1"));
        }
        if self.target_class.is_some_and(|c| c >= self.num_classes) {
            return Err(DecodeError::InvalidConfig(
                "target_class must be below num_classes",
            ));
        }
        if let CoordSpace::Pixel { width, height } = self.output_space {
            if width == 0 || height == 0 {
                return Err(DecodeError::InvalidConfig(
                    "pixel output space must have non-zero size",
                ));
            }
        }
        if self.max_detections == Some(0) {
            return Err(DecodeError::InvalidConfig(
                "max_detections must be at least 1",
            ));
        }
        Ok(())
    }

    /// Number of attributes each prediction must carry.
    pub fn expected_attributes(&self) -> usize {
        CLASS_OFFSET + self.num_classes
    }
}

/// Stateless decoder holding a validated configuration.
#[derive(Clone, Debug)]
pub struct Decoder {
    cfg: DecodeConfig,
}

impl Decoder {
    /// Validates `cfg` and builds a decoder.
    pub fn new(cfg: DecodeConfig) -> DecodeResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the decoder configuration.
    pub fn config(&self) -> &DecodeConfig {
        &self.cfg
    }

    /// Decodes `tensor` into detections sorted by descending confidence.
    ///
    /// Returns an empty vector when nothing clears the threshold.
    pub fn decode(&self, tensor: TensorView<'_>) -> DecodeResult<Vec<Detection>> {
        let cfg = &self.cfg;
        let expected = cfg.expected_attributes();
        let got = tensor.num_attributes(cfg.layout);
        if got != expected {
            return Err(DecodeError::ShapeMismatch { expected, got });
        }

        let _span = trace_span!(
            "decode",
            predictions = tensor.num_predictions(cfg.layout),
            parallel = cfg.parallel
        )
        .entered();

        let mut candidates = extract_candidates(tensor, cfg);
        trace_event!("decode_candidates", count = candidates.len());
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut kept = nms(&mut candidates, cfg.iou_threshold, cfg.nms);
        if let Some(max) = cfg.max_detections {
            kept.truncate(max);
        }

        trace_event!("decode_detections", count = kept.len());
        Ok(kept)
    }
}

/// Validates `cfg` and decodes `tensor` in one call.
pub fn decode(tensor: TensorView<'_>, cfg: &DecodeConfig) -> DecodeResult<Vec<Detection>> {
    cfg.validate()?;
    Decoder { cfg: cfg.clone() }.decode(tensor)
}

#[cfg(test)]
mod tests {
    use super::{DecodeConfig, Decoder};
    use crate::util::DecodeError;
    use crate::CoordSpace;

    #[test]
    fn default_config_is_valid() {
        assert!(DecodeConfig::default().validate().is_ok());
        assert_eq!(DecodeConfig::default().expected_attributes(), 85);
    }

    #[test]
    fn rejects_out_of_range_thresholds() {
        let cfg = DecodeConfig {
            confidence_threshold: 1.5,
            ..DecodeConfig::default()
        };
        assert!(matches!(
            Decoder::new(cfg).err(),
            Some(DecodeError::InvalidConfig(_))
        ));

        let cfg = DecodeConfig {
            iou_threshold: f32::NAN,
            ..DecodeConfig::default()
        };
        assert!(matches!(
            Decoder::new(cfg).err(),
            Some(DecodeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_inconsistent_class_setup() {
        let cfg = DecodeConfig {
            num_classes: 2,
            target_class: Some(2),
            ..DecodeConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = DecodeConfig {
            num_classes: 0,
            target_class: None,
            ..DecodeConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_empty_pixel_space() {
        let cfg = DecodeConfig {
            output_space: CoordSpace::Pixel {
                width: 0,
                height: 480,
            },
            ..DecodeConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
