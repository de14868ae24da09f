//! Per-frame analysis: inference followed by decoding.
//!
//! The model handle is owned by the caller and passed in explicitly as an
//! [`InferenceSession`]. A [`FrameAnalyzer`] runs at most one frame at a
//! time; frames that arrive while another is in flight are dropped rather
//! than queued, so a slow model never builds a backlog.

use std::sync::{Mutex, TryLockError};

use crate::decode::{DecodeConfig, Decoder};
use crate::detection::Detection;
use crate::tensor::RawTensor;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{DecodeError, DecodeResult};

/// A loaded detection model that turns a preprocessed input buffer into a
/// raw output tensor.
///
/// Implementors own image conversion details; `input` is the normalized
/// pixel buffer the model expects.
pub trait InferenceSession {
    type Error;

    /// Runs one forward pass.
    fn infer(&mut self, input: &[f32]) -> Result<RawTensor, Self::Error>;
}

/// What happened to a submitted frame.
#[derive(Debug, PartialEq)]
pub enum FrameOutcome {
    /// The frame was decoded; the list may be empty.
    Detections(Vec<Detection>),
    /// Another frame was still being analyzed, so this one was discarded.
    Dropped,
    /// The model output could not be decoded; nothing should be rendered.
    Skipped(DecodeError),
}

/// Runs an inference session and a decoder with keep-only-latest frame
/// admission.
pub struct FrameAnalyzer<S> {
    session: Mutex<S>,
    decoder: Decoder,
}

impl<S: InferenceSession> FrameAnalyzer<S> {
    /// Validates `cfg` and wraps `session`.
    pub fn new(session: S, cfg: DecodeConfig) -> DecodeResult<Self> {
        Ok(Self {
            session: Mutex::new(session),
            decoder: Decoder::new(cfg)?,
        })
    }

    /// Returns the decoder used for every frame.
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Analyzes one frame, or drops it if a previous frame is still running.
    ///
    /// Inference errors are returned; decode errors are reported as
    /// [`FrameOutcome::Skipped`].
    pub fn analyze(&self, input: &[f32]) -> Result<FrameOutcome, S::Error> {
        let mut session = match self.session.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                trace_event!("frame_dropped", input_len = input.len());
                return Ok(FrameOutcome::Dropped);
            }
            // A panic inside a previous `infer` leaves the session usable.
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        let _span = trace_span!("analyze_frame", input_len = input.len()).entered();
        let tensor = session.infer(input)?;

        match self.decoder.decode(tensor.view()) {
            Ok(detections) => Ok(FrameOutcome::Detections(detections)),
            Err(err) => {
                let reason = err.to_string();
                trace_warn!("frame_skipped", reason = reason.as_str());
                Ok(FrameOutcome::Skipped(err))
            }
        }
    }

    /// Returns the session to the caller.
    pub fn into_session(self) -> S {
        match self.session.into_inner() {
            Ok(session) => session,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
