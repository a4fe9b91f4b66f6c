use std::fmt;

pub mod executor;
pub mod jobs;
pub mod signal;
pub mod status;

pub use executor::ProcessExecutor;
pub use jobs::{JobEvent, JobTracker};
pub use signal::{Disposition, SignalController};
pub use status::Termination;

#[derive(Debug)]
pub enum ProcessError {
    Fork(std::io::Error),
    Wait(std::io::Error),
    Signal(std::io::Error),
    InvalidArgument(String),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Fork(_) => write!(f, "fork() process error"),
            ProcessError::Wait(e) => write!(f, "wait error: {}", e),
            ProcessError::Signal(e) => write!(f, "signal error: {}", e),
            ProcessError::InvalidArgument(arg) => {
                write!(f, "argument contains a NUL byte: {:?}", arg)
            }
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Fork(e) | ProcessError::Wait(e) | ProcessError::Signal(e) => Some(e),
            ProcessError::InvalidArgument(_) => None,
        }
    }
}
