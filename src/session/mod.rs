mod controller;
mod monitor;
mod session;
mod types;
mod worker;

pub use controller::{SessionConfig, SessionController, SessionControllerHandle};
pub use monitor::{MonitorConfig, ProgressMonitor};
pub use session::UploadSession;
pub use types::{
    ControllerCommand,
    MonitorOutcome,
    MonitorUpdate,
    SessionEvent,
    SessionId,
    SessionPhase,
};
