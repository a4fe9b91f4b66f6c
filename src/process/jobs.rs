use std::fmt;
use std::io;

use super::status::Termination;

/// Non-blocking `waitpid` on one pid. `Ok(None)` means no state change yet.
pub fn try_wait(pid: i32) -> io::Result<Option<Termination>> {
    let mut raw: libc::c_int = 0;
    // SAFETY: `raw` is a valid out-pointer for the duration of the call.
    let rc = unsafe { libc::waitpid(pid, &mut raw, libc::WNOHANG | libc::WUNTRACED) };
    match rc {
        -1 => Err(io::Error::last_os_error()),
        0 => Ok(None),
        _ => Ok(Termination::from_raw(raw)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Job {
    pid: i32,
    // Set when the launch-time check already reaped the child.
    reaped: Option<Termination>,
}

/// Something the tracker observed about a background job during a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEvent {
    Done { pid: i32, how: Termination },
    Stopped { pid: i32 },
}

impl JobEvent {
    pub fn pid(&self) -> i32 {
        match *self {
            JobEvent::Done { pid, .. } | JobEvent::Stopped { pid } => pid,
        }
    }
}

impl fmt::Display for JobEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            JobEvent::Done {
                pid,
                how: Termination::Signaled(signo),
            } => write!(f, "Child process {} done. Signaled {}.", pid, signo),
            JobEvent::Done {
                pid,
                how: Termination::Exited(code),
            } => write!(f, "Child process {} done. Exit status {}.", pid, code),
            JobEvent::Done {
                pid,
                how: Termination::Stopped(_),
            }
            | JobEvent::Stopped { pid } => write!(f, "Child process {} stopped. Continuing.", pid),
        }
    }
}

/// Background processes the shell launched and has not yet reported.
#[derive(Debug, Default)]
pub struct JobTracker {
    jobs: Vec<Job>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `pid`, reaping it right away if it already finished
    /// so it does not linger as a zombie. The completion is still reported
    /// by the next `poll`.
    pub fn launch(&mut self, pid: i32) {
        let reaped = match try_wait(pid) {
            Ok(Some(how)) if how.is_finished() => Some(how),
            _ => None,
        };
        self.jobs.push(Job { pid, reaped });
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, pid: i32) -> bool {
        self.jobs.iter().any(|job| job.pid == pid)
    }

    /// Checks every tracked job without blocking. Finished jobs are reported
    /// once and dropped; stopped jobs are resumed and kept.
    pub fn poll(&mut self) -> Vec<JobEvent> {
        let mut events = Vec::new();

        self.jobs.retain_mut(|job| {
            let observed = match job.reaped.take() {
                Some(how) => Ok(Some(how)),
                None => try_wait(job.pid),
            };

            match observed {
                Ok(None) => true,
                Ok(Some(Termination::Stopped(_))) => {
                    // SAFETY: plain kill(2) on a child we own.
                    unsafe {
                        libc::kill(job.pid, libc::SIGCONT);
                    }
                    events.push(JobEvent::Stopped { pid: job.pid });
                    true
                }
                Ok(Some(how)) => {
                    log::debug!("jobs: reaped {} ({})", job.pid, how);
                    events.push(JobEvent::Done { pid: job.pid, how });
                    false
                }
                Err(e) => {
                    log::debug!("jobs: dropping {}: {}", job.pid, e);
                    false
                }
            }
        });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::thread;
    use std::time::{Duration, Instant};

    fn spawn(program: &str, args: &[&str]) -> i32 {
        let child = Command::new(program).args(args).spawn().unwrap();
        child.id() as i32
    }

    fn poll_until_done(tracker: &mut JobTracker) -> Vec<JobEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while !tracker.is_empty() && Instant::now() < deadline {
            events.extend(tracker.poll());
            thread::sleep(Duration::from_millis(20));
        }
        events
    }

    #[test]
    fn test_reports_exit_and_removes() {
        let mut tracker = JobTracker::new();
        let pid = spawn("sh", &["-c", "exit 4"]);
        tracker.launch(pid);
        assert!(tracker.contains(pid));

        let events = poll_until_done(&mut tracker);
        assert_eq!(
            events,
            vec![JobEvent::Done {
                pid,
                how: Termination::Exited(4)
            }]
        );
        assert_eq!(
            events[0].to_string(),
            format!("Child process {} done. Exit status 4.", pid)
        );
        assert!(tracker.is_empty());
        assert!(tracker.poll().is_empty());
    }

    #[test]
    fn test_reaped_at_launch_is_reported_later() {
        let mut tracker = JobTracker::new();
        let pid = spawn("true", &[]);
        thread::sleep(Duration::from_millis(200));
        tracker.launch(pid);
        assert_eq!(tracker.len(), 1);

        let events = tracker.poll();
        assert_eq!(
            events,
            vec![JobEvent::Done {
                pid,
                how: Termination::Exited(0)
            }]
        );
    }

    #[test]
    fn test_running_job_stays() {
        let mut tracker = JobTracker::new();
        let pid = spawn("sleep", &["5"]);
        tracker.launch(pid);
        assert!(tracker.poll().is_empty());
        assert!(tracker.contains(pid));

        unsafe {
            libc::kill(pid, libc::SIGTERM);
        }
        let events = poll_until_done(&mut tracker);
        assert_eq!(
            events,
            vec![JobEvent::Done {
                pid,
                how: Termination::Signaled(libc::SIGTERM)
            }]
        );
        assert_eq!(
            events[0].to_string(),
            format!("Child process {} done. Signaled 15.", pid)
        );
    }

    #[test]
    fn test_stopped_job_is_resumed() {
        let mut tracker = JobTracker::new();
        let pid = spawn("sleep", &["0.5"]);
        tracker.launch(pid);

        unsafe {
            libc::kill(pid, libc::SIGSTOP);
        }
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while events.is_empty() && Instant::now() < deadline {
            events = tracker.poll();
            thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(events, vec![JobEvent::Stopped { pid }]);
        assert_eq!(
            events[0].to_string(),
            format!("Child process {} stopped. Continuing.", pid)
        );
        assert!(tracker.contains(pid));

        let events = poll_until_done(&mut tracker);
        assert_eq!(
            events,
            vec![JobEvent::Done {
                pid,
                how: Termination::Exited(0)
            }]
        );
        assert_eq!(events[0].pid(), pid);
    }

    #[test]
    fn test_unknown_pid_dropped() {
        let mut tracker = JobTracker::new();
        // pid 1 is never our child.
        tracker.launch(1);
        assert!(tracker.poll().is_empty());
        assert!(tracker.is_empty());
    }
}
