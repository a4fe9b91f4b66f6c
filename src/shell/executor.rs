use crate::core::commands::{BuiltinContext, Outcome};
use crate::error::ShellError;
use crate::expand::{expand, ExpansionContext};
use crate::process::executor::Spawned;
use crate::process::ProcessError;

use super::Flow;

pub(crate) trait CommandHandler {
    fn execute_command(&mut self, line: &str) -> Result<Flow, ShellError>;
}

impl CommandHandler for super::Shell {
    fn execute_command(&mut self, line: &str) -> Result<Flow, ShellError> {
        let home = self.config.home_str();
        let expanded = expand(
            line,
            &ExpansionContext {
                home: &home,
                shell_pid: self.shell_pid,
                last_status: self.state.last_status(),
                last_background: self.state.last_background(),
            },
        )?;

        let Some(command) = self.tokenizer.parse(&expanded)? else {
            return Ok(Flow::Continue);
        };

        let builtin = {
            let ctx = BuiltinContext {
                state: &self.state,
                home: self.config.home.as_deref(),
            };
            self.builtins.execute(command.name(), &command.args[1..], &ctx)
        };

        if let Some(result) = builtin {
            return match result {
                Ok(Outcome::Status(status)) => {
                    self.state.record_foreground_status(status);
                    Ok(Flow::Continue)
                }
                Ok(Outcome::Exit { code, explicit }) => Ok(Flow::Exit { code, explicit }),
                Err(e) => {
                    if let Some(status) = e.failure_status() {
                        self.state.record_foreground_status(status);
                    }
                    Err(e.into())
                }
            };
        }

        match self.executor.spawn(&command, &mut self.jobs) {
            Ok(Spawned::Foreground(how)) => {
                self.state.record_foreground_status(how.exit_code());
            }
            Ok(Spawned::Background(pid)) => {
                self.state.record_background_pid(pid);
                self.signals.set_forward_target(Some(pid));
            }
            Err(e @ ProcessError::Fork(_)) => {
                self.state.record_foreground_status(1);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Flow::Continue)
    }
}
