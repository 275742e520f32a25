pub mod client;
pub mod coords;
pub mod host;
pub mod models;
pub mod session;
pub mod snapshot;

pub use client::{ClientConfig, SubmissionClient, SubmitError, SubmitResult};
pub use coords::{PointerPos, RenderedRect, map_to_native};
pub use host::SessionHost;
pub use models::{Detection, ImageSource, SelectionPoint};
pub use session::{SelectionSession, SessionState, Submission, SubmissionOutcome};
