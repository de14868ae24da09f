//! Candidate extraction and pruning.
//!
//! Extraction turns raw predictions into scored detections; suppression
//! removes overlapping duplicates.

pub(crate) mod extract;
pub(crate) mod nms;
