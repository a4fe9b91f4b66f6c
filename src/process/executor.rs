use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use super::jobs::JobTracker;
use super::signal;
use super::status::Termination;
use super::ProcessError;
use crate::shell::parser::ParsedCommand;

/// Result of handing a command to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spawned {
    Foreground(Termination),
    Background(i32),
}

/// Everything the child needs, built before `fork` so the child never
/// allocates.
struct ChildPlan {
    argv: Vec<CString>,
    input: Option<Redirect>,
    output: Option<Redirect>,
    exec_failed: Vec<u8>,
}

struct Redirect {
    path: CString,
    open_failed: Vec<u8>,
    dup_failed: Vec<u8>,
}

impl Redirect {
    fn new(path: &Path, stream: &str) -> Result<Self, ProcessError> {
        Ok(Self {
            path: c_string(path.as_os_str().as_bytes())?,
            open_failed: format!("smallsh: unable to open file {}\n", path.display()).into_bytes(),
            dup_failed: format!("smallsh: {} file error\n", stream).into_bytes(),
        })
    }
}

fn c_string(bytes: &[u8]) -> Result<CString, ProcessError> {
    CString::new(bytes)
        .map_err(|_| ProcessError::InvalidArgument(String::from_utf8_lossy(bytes).into_owned()))
}

impl ChildPlan {
    fn new(command: &ParsedCommand) -> Result<Self, ProcessError> {
        let argv = command
            .args
            .iter()
            .map(|arg| c_string(arg.as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            argv,
            input: command
                .redirect
                .input
                .as_deref()
                .map(|p| Redirect::new(p, "input"))
                .transpose()?,
            output: command
                .redirect
                .output
                .as_deref()
                .map(|p| Redirect::new(p, "output"))
                .transpose()?,
            exec_failed: b"smallsh: execv error\n".to_vec(),
        })
    }
}

fn write_stderr(message: &[u8]) {
    // SAFETY: write(2) on a borrowed, initialized buffer.
    unsafe {
        libc::write(libc::STDERR_FILENO, message.as_ptr().cast(), message.len());
    }
}

fn die(message: &[u8]) -> ! {
    write_stderr(message);
    // SAFETY: _exit skips atexit handlers and stdio flushing, which belong
    // to the parent's copy of the address space.
    unsafe { libc::_exit(1) }
}

fn bind(redirect: &Redirect, flags: libc::c_int, target: libc::c_int) {
    // SAFETY: `redirect.path` is a NUL-terminated string owned by the plan.
    let fd = unsafe { libc::open(redirect.path.as_ptr(), flags, 0o777 as libc::c_uint) };
    if fd < 0 {
        die(&redirect.open_failed);
    }
    // SAFETY: both descriptors are valid in this process.
    if unsafe { libc::dup2(fd, target) } == -1 {
        die(&redirect.dup_failed);
    }
    // SAFETY: `fd` is ours and no longer needed once duplicated.
    unsafe {
        libc::close(fd);
    }
}

/// Child side of the fork. Only async-signal-safe calls from here on.
fn run_child(plan: &ChildPlan, argv: &[*const libc::c_char]) -> ! {
    signal::reset_in_child();

    if let Some(input) = &plan.input {
        bind(input, libc::O_RDONLY, libc::STDIN_FILENO);
    }
    if let Some(output) = &plan.output {
        bind(
            output,
            libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
            libc::STDOUT_FILENO,
        );
    }

    // SAFETY: `argv` is a null-terminated array of pointers into `plan`,
    // which outlives the call; execvp only returns on failure.
    unsafe {
        libc::execvp(argv[0], argv.as_ptr());
    }
    die(&plan.exec_failed)
}

/// Blocks until `pid` terminates, retrying when interrupted.
pub fn wait_for(pid: i32) -> Result<Termination, ProcessError> {
    loop {
        let mut raw: libc::c_int = 0;
        // SAFETY: `raw` is a valid out-pointer for the duration of the call.
        let rc = unsafe { libc::waitpid(pid, &mut raw, 0) };
        if rc == -1 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(ProcessError::Wait(err));
        }
        if let Some(how) = Termination::from_raw(raw) {
            return Ok(how);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Forks and execs `command`. Foreground commands are waited for;
    /// background commands are handed to `jobs` and return immediately.
    pub fn spawn(
        &self,
        command: &ParsedCommand,
        jobs: &mut JobTracker,
    ) -> Result<Spawned, ProcessError> {
        let plan = ChildPlan::new(command)?;
        if plan.argv.is_empty() {
            return Err(ProcessError::InvalidArgument(String::new()));
        }

        // Anything still buffered would otherwise be written twice.
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();

        let mut argv: Vec<*const libc::c_char> = plan.argv.iter().map(|a| a.as_ptr()).collect();
        argv.push(std::ptr::null());

        // SAFETY: the child only performs async-signal-safe work (see
        // `run_child`) before exec or _exit.
        let pid = unsafe { libc::fork() };
        match pid {
            -1 => Err(ProcessError::Fork(io::Error::last_os_error())),
            0 => run_child(&plan, &argv),
            pid => {
                log::debug!(
                    "spawned {} as {}{}",
                    command.name(),
                    pid,
                    if command.background { " (background)" } else { "" }
                );
                if command.background {
                    jobs.launch(pid);
                    Ok(Spawned::Background(pid))
                } else {
                    let how = wait_for(pid)?;
                    log::debug!("foreground {} {}", pid, how);
                    Ok(Spawned::Foreground(how))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::parser::Tokenizer;
    use std::fs;

    fn command(line: &str) -> ParsedCommand {
        Tokenizer::default().parse(line).unwrap().unwrap()
    }

    fn run(line: &str) -> Spawned {
        let mut jobs = JobTracker::new();
        ProcessExecutor::new().spawn(&command(line), &mut jobs).unwrap()
    }

    #[test]
    fn test_foreground_exit_code() {
        assert_eq!(run("true"), Spawned::Foreground(Termination::Exited(0)));
        assert_eq!(run("false"), Spawned::Foreground(Termination::Exited(1)));
    }

    #[test]
    fn test_command_not_found() {
        assert_eq!(
            run("smallsh-test-no-such-command"),
            Spawned::Foreground(Termination::Exited(1))
        );
    }

    #[test]
    fn test_output_then_input_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let copy = dir.path().join("copy.txt");

        run(&format!("echo hello redirect > {}", out.display()));
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello redirect\n");

        run(&format!("cat < {} > {}", out.display(), copy.display()));
        assert_eq!(fs::read_to_string(&copy).unwrap(), "hello redirect\n");
    }

    #[test]
    fn test_output_redirect_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        fs::write(&out, "a much longer previous content\n").unwrap();

        run(&format!("echo short > {}", out.display()));
        assert_eq!(fs::read_to_string(&out).unwrap(), "short\n");
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert_eq!(
            run(&format!("cat < {}", missing.display())),
            Spawned::Foreground(Termination::Exited(1))
        );
    }

    #[test]
    fn test_background_is_tracked() {
        let mut jobs = JobTracker::new();
        let spawned = ProcessExecutor::new()
            .spawn(&command("sleep 0 &"), &mut jobs)
            .unwrap();
        let Spawned::Background(pid) = spawned else {
            panic!("expected a background spawn, got {:?}", spawned);
        };
        assert!(jobs.contains(pid));
        wait_for(pid).ok();
    }

    #[test]
    fn test_interior_nul_rejected() {
        let mut jobs = JobTracker::new();
        let cmd = ParsedCommand {
            args: vec!["echo".to_string(), "a\0b".to_string()],
            redirect: Default::default(),
            background: false,
        };
        assert!(matches!(
            ProcessExecutor::new().spawn(&cmd, &mut jobs),
            Err(ProcessError::InvalidArgument(_))
        ));
    }
}
