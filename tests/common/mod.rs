mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from clickcrop for tests
pub use clickcrop::{
    ImageSource, PointerPos, RenderedRect, SelectionSession, SessionState, SubmissionOutcome,
};
