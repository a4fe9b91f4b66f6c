use std::fmt;

/// How a child changed state, decoded from a raw `waitpid` status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
    Stopped(i32),
}

impl Termination {
    pub fn from_raw(status: libc::c_int) -> Option<Self> {
        if libc::WIFEXITED(status) {
            Some(Termination::Exited(libc::WEXITSTATUS(status)))
        } else if libc::WIFSIGNALED(status) {
            Some(Termination::Signaled(libc::WTERMSIG(status)))
        } else if libc::WIFSTOPPED(status) {
            Some(Termination::Stopped(libc::WSTOPSIG(status)))
        } else {
            None
        }
    }

    /// Value `$?` reports for a foreground command that ended this way.
    pub fn exit_code(self) -> i32 {
        match self {
            Termination::Exited(code) => code,
            Termination::Signaled(signo) | Termination::Stopped(signo) => 128 + signo,
        }
    }

    pub fn is_finished(self) -> bool {
        !matches!(self, Termination::Stopped(_))
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |signo: i32| signal_hook::low_level::signal_name(signo).unwrap_or("unknown");
        match *self {
            Termination::Exited(code) => write!(f, "exited with {}", code),
            Termination::Signaled(signo) => write!(f, "killed by {} ({})", name(signo), signo),
            Termination::Stopped(signo) => write!(f, "stopped by {} ({})", name(signo), signo),
        }
    }
}
