//! Recorder lifecycle domain module

mod session;
mod state;
mod status;

pub use session::{Session, SessionId};
pub use state::{Action, ActionRejected, Availability, RecorderState};
pub use status::Status;
