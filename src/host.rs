use std::time::{Duration, Instant};

use anyhow::Result;

use crate::client::SubmissionClient;
use crate::coords::{PointerPos, RenderedRect};
use crate::models::{Detection, ImageSource};
use crate::session::{SelectionSession, SessionState, SubmissionOutcome};

/// Top-level coordinator tying the session to the submission client.
///
/// Owns the published detection set and the round-trip timing alongside the
/// session itself, so shells read everything they display from one place.
pub struct SessionHost {
    session: SelectionSession,
    client: SubmissionClient,
    detections: Vec<Detection>,
    round_trip: Option<Duration>,
}

impl SessionHost {
    pub fn new(client: SubmissionClient) -> Self {
        Self {
            session: SelectionSession::new(),
            client,
            detections: Vec::new(),
            round_trip: None,
        }
    }

    /// Load a new image, clearing published detections and timing.
    ///
    /// Returns whether the session accepted the load; it refuses while a
    /// submission is in flight.
    pub fn load_image(&mut self, source: ImageSource) -> bool {
        if !self.session.load_image(source) {
            return false;
        }
        self.detections.clear();
        self.round_trip = None;
        true
    }

    /// Toggle selection mode on the underlying session.
    pub fn toggle_selection(&mut self) -> bool {
        self.session.toggle_selection()
    }

    /// Leave selection mode without picking a point.
    pub fn cancel(&mut self) -> bool {
        self.session.cancel()
    }

    /// Handle a click: run the session transition and, when it produces a
    /// submission, drive that submission to resolution.
    ///
    /// A non-empty result replaces the published detection set; an empty
    /// list, a malformed response, and a transport failure all clear it and
    /// resolve the session identically. The round trip is timed from just
    /// before the request until it resolves, whatever the outcome. Holding
    /// `&mut self` across the await keeps submissions strictly sequential.
    pub async fn click(&mut self, pointer: PointerPos, rect: RenderedRect) -> Result<SessionState> {
        let Some(submission) = self.session.click(pointer, rect)? else {
            return Ok(self.session.state());
        };

        let started = Instant::now();
        let result = self.client.submit(submission.point, &submission.snapshot).await;
        self.round_trip = Some(started.elapsed());

        match result {
            Ok(detections) if !detections.is_empty() => {
                log::info!("received {} detections", detections.len());
                self.detections = detections;
                self.session.resolve_submission(SubmissionOutcome::Results);
            }
            Ok(_) => {
                log::info!("no detections returned");
                self.detections.clear();
                self.session.resolve_submission(SubmissionOutcome::Empty);
            }
            Err(e) => {
                log::warn!("submission failed: {e}");
                self.detections.clear();
                self.session.resolve_submission(SubmissionOutcome::Empty);
            }
        }

        Ok(self.session.state())
    }

    /// The published detection set, in service order.
    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Elapsed seconds of the most recent round trip, for display.
    pub fn response_seconds(&self) -> Option<f64> {
        self.round_trip.map(|d| d.as_secs_f64())
    }

    pub fn session(&self) -> &SelectionSession {
        &self.session
    }
}
