use std::io;
use std::sync::atomic::{AtomicI32, Ordering};

use signal_hook::consts::{SIGINT, SIGTSTP};

use super::ProcessError;

/// Pid the prompt-phase SIGINT handler forwards to; 0 when there is none.
static FORWARD_PID: AtomicI32 = AtomicI32::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ignore,
    Default,
    /// Forward SIGINT to the most recent background process.
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Prompt,
    Exec,
}

extern "C" fn handle_sigint(signo: libc::c_int) {
    forward_to_background(signo);
}

// Runs in signal context: atomics, kill(2) and write(2) only.
fn forward_to_background(signo: libc::c_int) {
    let pid = FORWARD_PID.load(Ordering::SeqCst);
    if pid <= 0 {
        return;
    }

    let mut buf = [0u8; 80];
    let len = format_notice(&mut buf, pid, signo);
    // SAFETY: kill and write are async-signal-safe and `buf[..len]` is
    // initialized stack memory.
    unsafe {
        libc::kill(pid, SIGINT);
        libc::write(libc::STDERR_FILENO, buf.as_ptr().cast(), len);
    }
}

/// Formats `Child process <pid> done. Signaled <signo>.\n` without allocating.
fn format_notice(buf: &mut [u8], pid: i32, signo: i32) -> usize {
    let mut len = 0;
    len = push_bytes(buf, len, b"Child process ");
    len = push_decimal(buf, len, pid);
    len = push_bytes(buf, len, b" done. Signaled ");
    len = push_decimal(buf, len, signo);
    push_bytes(buf, len, b".\n")
}

fn push_bytes(buf: &mut [u8], at: usize, bytes: &[u8]) -> usize {
    let end = (at + bytes.len()).min(buf.len());
    buf[at..end].copy_from_slice(&bytes[..end - at]);
    end
}

fn push_decimal(buf: &mut [u8], at: usize, value: i32) -> usize {
    let mut digits = [0u8; 10];
    let mut n = value.unsigned_abs();
    let mut i = digits.len();
    loop {
        i -= 1;
        digits[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    let at = if value < 0 { push_bytes(buf, at, b"-") } else { at };
    push_bytes(buf, at, &digits[i..])
}

fn handler_address(disposition: Disposition) -> libc::sighandler_t {
    match disposition {
        Disposition::Ignore => libc::SIG_IGN,
        Disposition::Default => libc::SIG_DFL,
        Disposition::Forward => handle_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t,
    }
}

/// Installs `disposition` for `signo` with every signal blocked while the
/// handler runs and without `SA_RESTART`.
pub fn set_disposition(signo: libc::c_int, disposition: Disposition) -> io::Result<()> {
    // SAFETY: a zeroed sigaction is a valid value; every field we rely on is
    // set explicitly below.
    let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
    action.sa_sigaction = handler_address(disposition);
    action.sa_flags = 0;

    // SAFETY: `action` is a live, properly aligned sigaction.
    let rc = unsafe {
        libc::sigfillset(&mut action.sa_mask);
        libc::sigaction(signo, &action, std::ptr::null_mut())
    };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Reads back the current disposition of `signo`. `None` means a handler
/// this module did not install.
pub fn disposition(signo: libc::c_int) -> io::Result<Option<Disposition>> {
    // SAFETY: as in `set_disposition`; a null new-action only queries.
    let mut old: libc::sigaction = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::sigaction(signo, std::ptr::null(), &mut old) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    let found = [Disposition::Ignore, Disposition::Default, Disposition::Forward]
        .into_iter()
        .find(|d| handler_address(*d) == old.sa_sigaction);
    Ok(found)
}

/// Restores SIGINT to its default action. Called in a freshly forked child,
/// so it must stay async-signal-safe.
pub fn reset_in_child() -> bool {
    set_disposition(SIGINT, Disposition::Default).is_ok()
}

/// Owns the shell's SIGINT/SIGTSTP dispositions across the read-eval loop.
#[derive(Debug)]
pub struct SignalController {
    phase: Phase,
}

impl SignalController {
    /// Ignores SIGTSTP for the lifetime of the shell and starts in the exec
    /// phase with SIGINT ignored.
    pub fn install() -> Result<Self, ProcessError> {
        set_disposition(SIGTSTP, Disposition::Ignore).map_err(ProcessError::Signal)?;
        set_disposition(SIGINT, Disposition::Ignore).map_err(ProcessError::Signal)?;
        Ok(Self { phase: Phase::Exec })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Right before blocking for input.
    pub fn enter_prompt(&mut self) -> Result<(), ProcessError> {
        set_disposition(SIGINT, Disposition::Forward).map_err(ProcessError::Signal)?;
        self.phase = Phase::Prompt;
        log::debug!("signals: prompt phase");
        Ok(())
    }

    /// Right after a line has been read.
    pub fn enter_exec(&mut self) -> Result<(), ProcessError> {
        set_disposition(SIGINT, Disposition::Ignore).map_err(ProcessError::Signal)?;
        self.phase = Phase::Exec;
        log::debug!("signals: exec phase");
        Ok(())
    }

    pub fn set_forward_target(&self, pid: Option<i32>) {
        FORWARD_PID.store(pid.unwrap_or(0), Ordering::SeqCst);
    }

    pub fn forward_target(&self) -> Option<i32> {
        match FORWARD_PID.load(Ordering::SeqCst) {
            0 => None,
            pid => Some(pid),
        }
    }

    /// Same action as the prompt-phase handler, for input sources that
    /// report Ctrl-C as a key press instead of a signal.
    pub fn forward_interrupt(&self) {
        forward_to_background(SIGINT);
    }
}
