use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

mod cd;
mod exit;

pub use cd::CdCommand;
pub use exit::ExitCommand;

use super::state::SessionState;

#[derive(Debug)]
pub enum CommandError {
    InvalidArguments(&'static str),
    HomeDirNotFound,
    ChangeDirectory(std::io::Error),
}

impl CommandError {
    /// Status recorded as `$?` when this error ends a builtin, if any.
    pub fn failure_status(&self) -> Option<i32> {
        match self {
            CommandError::InvalidArguments(_) => None,
            CommandError::HomeDirNotFound | CommandError::ChangeDirectory(_) => Some(1),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::InvalidArguments(msg) => write!(f, "{}", msg),
            CommandError::HomeDirNotFound | CommandError::ChangeDirectory(_) => {
                write!(f, "change directory error")
            }
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::ChangeDirectory(e) => Some(e),
            _ => None,
        }
    }
}

/// What the read-eval loop should do after a builtin ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Status(i32),
    Exit { code: i32, explicit: bool },
}

pub struct BuiltinContext<'a> {
    pub state: &'a SessionState,
    pub home: Option<&'a Path>,
}

pub trait Command {
    fn execute(&self, args: &[String], ctx: &BuiltinContext<'_>) -> Result<Outcome, CommandError>;
}

#[derive(Clone)]
enum CommandType {
    Cd(CdCommand),
    Exit(ExitCommand),
}

impl Command for CommandType {
    fn execute(&self, args: &[String], ctx: &BuiltinContext<'_>) -> Result<Outcome, CommandError> {
        match self {
            CommandType::Cd(cmd) => cmd.execute(args, ctx),
            CommandType::Exit(cmd) => cmd.execute(args, ctx),
        }
    }
}

/// Commands handled inside the shell process instead of being forked.
#[derive(Clone)]
pub struct Builtins {
    commands: BTreeMap<String, CommandType>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

impl Builtins {
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("cd".to_string(), CommandType::Cd(CdCommand::new()));
        commands.insert("exit".to_string(), CommandType::Exit(ExitCommand::new()));
        Self { commands }
    }

    #[cfg(test)]
    pub(crate) fn is_builtin(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }

    /// Runs `command` if it is a builtin. `None` means it is not one and
    /// should be handed to the process executor.
    pub fn execute(
        &self,
        command: &str,
        args: &[String],
        ctx: &BuiltinContext<'_>,
    ) -> Option<Result<Outcome, CommandError>> {
        self.commands.get(command).map(|cmd| cmd.execute(args, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_detection() {
        let builtins = Builtins::new();
        assert!(builtins.is_builtin("cd"));
        assert!(builtins.is_builtin("exit"));
        assert!(!builtins.is_builtin("ls"));
        assert!(!builtins.is_builtin(""));
    }

    #[test]
    fn test_external_is_not_handled() {
        let state = SessionState::new();
        let ctx = BuiltinContext {
            state: &state,
            home: None,
        };
        assert!(Builtins::new().execute("echo", &[], &ctx).is_none());
    }

    #[test]
    fn test_exit_dispatch() {
        let mut state = SessionState::new();
        state.record_foreground_status(5);
        let ctx = BuiltinContext {
            state: &state,
            home: None,
        };
        let outcome = Builtins::new().execute("exit", &[], &ctx).unwrap().unwrap();
        assert_eq!(
            outcome,
            Outcome::Exit {
                code: 5,
                explicit: false
            }
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            CommandError::InvalidArguments("too many arguments").to_string(),
            "too many arguments"
        );
        assert_eq!(
            CommandError::HomeDirNotFound.to_string(),
            "change directory error"
        );
        assert_eq!(CommandError::HomeDirNotFound.failure_status(), Some(1));
        assert_eq!(
            CommandError::InvalidArguments("x").failure_status(),
            None
        );
    }
}
