//! detdecode turns raw YOLO-style detection tensors into ranked bounding boxes.
//!
//! The core is a stateless decoder: confidence scoring, class selection,
//! center-to-corner conversion, rescaling into a target image and
//! non-maximum suppression. Running the model itself is left to the caller,
//! who plugs it in through [`InferenceSession`]. Parallel candidate decoding
//! is available via the `rayon` feature.

pub mod analyzer;
mod candidate;
pub mod decode;
pub mod detection;
pub mod tensor;
mod trace;
pub mod util;

pub use analyzer::{FrameAnalyzer, FrameOutcome, InferenceSession};
pub use candidate::nms::{nms, NmsMode};
pub use decode::{
    decode, DecodeConfig, Decoder, ScoringMode, COCO_CLASSES, MODEL_INPUT_SIZE, PERSON_CLASS_ID,
    YOLOV5_PREDICTIONS,
};
pub use detection::{BoundingBox, CoordSpace, Detection};
pub use tensor::{Layout, RawTensor, TensorView};
pub use util::{DecodeError, DecodeResult};
