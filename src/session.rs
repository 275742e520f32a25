use anyhow::Result;

use crate::coords::{self, PointerPos, RenderedRect};
use crate::models::{ImageSource, SelectionPoint};
use crate::snapshot;

/// Lifecycle of one image/selection session.
///
/// Exactly one state is active at a time; it is the sole gate deciding
/// which user events have any effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing loaded yet.
    NoImage,
    /// An image is loaded and idle.
    Ready,
    /// The next click on the image picks a point.
    Selecting,
    /// A submission is in flight; all inputs are ignored until it resolves.
    Submitting,
    /// The last submission produced detections; selection can be re-armed
    /// on the same image.
    ResultsReady,
    /// The last submission produced nothing usable; a new image is required
    /// before selecting again.
    ResultsEmpty,
}

/// How an in-flight submission resolved, reported by whoever drove the
/// network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// At least one detection came back.
    Results,
    /// Empty list, malformed response, or transport failure.
    Empty,
}

/// Payload prepared by a click: the mapped point plus the snapshot to send.
#[derive(Debug, Clone)]
pub struct Submission {
    pub point: SelectionPoint,
    pub snapshot: String,
}

/// State machine owning the loaded image, the chosen point, and the
/// submission lifecycle.
///
/// Every method is synchronous and runs to completion. The suspending part
/// of a submission (the network round trip) lives with the caller, which
/// reports back through [`resolve_submission`](Self::resolve_submission);
/// the session stays in `Submitting` and deaf to input in between.
#[derive(Debug)]
pub struct SelectionSession {
    state: SessionState,
    source: Option<ImageSource>,
    point: Option<SelectionPoint>,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::NoImage,
            source: None,
            point: None,
        }
    }

    /// Replace the loaded image, clear the previous point, and return to
    /// `Ready`.
    ///
    /// Refused while a submission is in flight: the outstanding request
    /// cannot be cancelled, so its resolution must land on the image it was
    /// made for. Returns whether the load was accepted.
    pub fn load_image(&mut self, source: ImageSource) -> bool {
        if self.state == SessionState::Submitting {
            log::warn!("image load rejected while a submission is in flight");
            return false;
        }
        self.source = Some(source);
        self.point = None;
        self.state = SessionState::Ready;
        true
    }

    /// Toggle selection mode on or off. Arming clears the previous point.
    ///
    /// Ignored without an image, while submitting, and after an empty or
    /// failed submission (a fresh image is required then). Returns whether
    /// the state changed.
    pub fn toggle_selection(&mut self) -> bool {
        match self.state {
            SessionState::Ready | SessionState::ResultsReady => {
                self.point = None;
                self.state = SessionState::Selecting;
                true
            }
            SessionState::Selecting => {
                self.state = SessionState::Ready;
                true
            }
            SessionState::NoImage | SessionState::Submitting | SessionState::ResultsEmpty => {
                log::debug!("selection toggle ignored in {:?}", self.state);
                false
            }
        }
    }

    /// Leave selection mode without picking a point. A no-op in every other
    /// state. Returns whether the state changed.
    pub fn cancel(&mut self) -> bool {
        if self.state == SessionState::Selecting {
            self.state = SessionState::Ready;
            true
        } else {
            false
        }
    }

    /// Handle a pointer click at `pointer` on the image rendered at `rect`.
    ///
    /// Only a click while `Selecting` has any effect: the position is mapped
    /// to native pixels and recorded, the image is snapshotted at native
    /// resolution, and the session enters `Submitting`. The returned
    /// [`Submission`] must be dispatched by the caller, which then reports
    /// the outcome via [`resolve_submission`](Self::resolve_submission).
    ///
    /// If the snapshot cannot be encoded, the point stays recorded but no
    /// submission starts and the session returns to `Ready`.
    pub fn click(
        &mut self,
        pointer: PointerPos,
        rect: RenderedRect,
    ) -> Result<Option<Submission>> {
        if self.state != SessionState::Selecting {
            log::debug!("click ignored in {:?}", self.state);
            return Ok(None);
        }
        let Some(source) = self.source.as_ref() else {
            return Ok(None);
        };
        let Some(image) = source.image() else {
            log::debug!("click ignored: native dimensions not resolved yet");
            return Ok(None);
        };

        let point = coords::map_to_native(rect, pointer, source.dimensions());
        self.point = Some(point);
        log::debug!("selected point x={} y={}", point.x, point.y);

        match snapshot::encode_snapshot(image) {
            Ok(snapshot) => {
                self.state = SessionState::Submitting;
                Ok(Some(Submission { point, snapshot }))
            }
            Err(e) => {
                self.state = SessionState::Ready;
                Err(e)
            }
        }
    }

    /// Record how the in-flight submission resolved.
    ///
    /// `Results` re-arms the session on the same image, keeping the chosen
    /// point for display; `Empty` locks selection until a new image is
    /// loaded. Ignored unless a submission is actually pending.
    pub fn resolve_submission(&mut self, outcome: SubmissionOutcome) {
        if self.state != SessionState::Submitting {
            log::debug!("submission resolution ignored in {:?}", self.state);
            return;
        }
        self.state = match outcome {
            SubmissionOutcome::Results => SessionState::ResultsReady,
            SubmissionOutcome::Empty => SessionState::ResultsEmpty,
        };
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The most recently chosen point, if any.
    pub fn point(&self) -> Option<SelectionPoint> {
        self.point
    }

    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    /// Whether a submission is in flight. Shells disable the selection
    /// toggle, the image input, and click handling while this is true.
    pub fn is_busy(&self) -> bool {
        self.state == SessionState::Submitting
    }
}

impl Default for SelectionSession {
    fn default() -> Self {
        Self::new()
    }
}
