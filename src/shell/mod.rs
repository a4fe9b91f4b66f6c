use std::io::Write;

mod executor;
pub mod parser;

use crate::{
    core::{commands::Builtins, config::ShellConfig, state::SessionState},
    error::ShellError,
    input::{Input, LineReader},
    process::{signal::Phase, JobEvent, JobTracker, ProcessExecutor, SignalController},
};

use executor::CommandHandler;
use parser::Tokenizer;

/// What the loop does after one line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit { code: i32, explicit: bool },
}

pub struct Shell {
    pub(crate) reader: LineReader,
    pub(crate) config: ShellConfig,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) builtins: Builtins,
    pub(crate) executor: ProcessExecutor,
    pub(crate) jobs: JobTracker,
    pub(crate) signals: SignalController,
    pub(crate) state: SessionState,
    pub(crate) shell_pid: u32,
}

impl Shell {
    pub fn new(config: ShellConfig, reader: LineReader) -> Result<Self, ShellError> {
        let signals = SignalController::install()?;
        let tokenizer = Tokenizer::new(&config.delimiters, config.max_words);

        Ok(Shell {
            reader,
            config,
            tokenizer,
            builtins: Builtins::new(),
            executor: ProcessExecutor::new(),
            jobs: JobTracker::new(),
            signals,
            state: SessionState::new(),
            shell_pid: std::process::id(),
        })
    }

    /// Runs the read-eval loop until `exit` or end of input and returns the
    /// code the process should exit with.
    pub fn run(&mut self) -> Result<i32, ShellError> {
        loop {
            self.report_jobs();

            self.signals.enter_prompt()?;
            let input = self.reader.read_line(&self.config.prompt);
            self.signals.enter_exec()?;

            let flow = match input? {
                Input::Eof => Flow::Exit {
                    code: self.state.last_status(),
                    explicit: false,
                },
                Input::Interrupted => {
                    self.signals.forward_interrupt();
                    continue;
                }
                Input::Line(line) if line.trim().is_empty() => continue,
                Input::Line(line) => match self.execute_command(&line) {
                    Ok(flow) => flow,
                    Err(e) if e.is_recoverable() => {
                        eprintln!("smallsh: {}", e);
                        Flow::Continue
                    }
                    Err(e) => return Err(e),
                },
            };

            if let Flow::Exit { code, explicit } = flow {
                self.terminate(code, explicit);
                return Ok(code);
            }
        }
    }

    fn report_jobs(&mut self) {
        for event in self.jobs.poll() {
            eprintln!("{}", event);
            let finished = matches!(event, JobEvent::Done { .. });
            if finished && self.signals.forward_target() == Some(event.pid()) {
                self.signals.set_forward_target(None);
            }
        }
    }

    /// Prints the exit notice and interrupts everything in the shell's
    /// process group. The shell itself has SIGINT ignored at this point.
    fn terminate(&self, code: i32, explicit: bool) {
        debug_assert_eq!(self.signals.phase(), Phase::Exec);
        let _ = std::io::stdout().flush();
        if explicit {
            eprintln!("\nexit {}", code);
        } else {
            eprintln!("\nexit");
        }
        log::debug!("exiting with {}", code);
        // SAFETY: kill(2) with pid 0 targets our own process group.
        unsafe {
            libc::kill(0, libc::SIGINT);
        }
    }
}
