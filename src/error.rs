use crate::core::commands::CommandError;
use crate::core::config::ConfigError;
use crate::expand::ExpandError;
use crate::process::ProcessError;
use crate::shell::parser::ParseError;

#[derive(Debug)]
pub enum ShellError {
    Readline(rustyline::error::ReadlineError),
    Io(std::io::Error),
    Expand(ExpandError),
    Parse(ParseError),
    Command(CommandError),
    Process(ProcessError),
    Config(ConfigError),
    FlagError(String),
    Logger(log::SetLoggerError),
}

impl ShellError {
    /// Errors that end the current command but leave the shell running.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ShellError::Expand(_) | ShellError::Parse(_) | ShellError::Command(_) => true,
            ShellError::Process(ProcessError::Signal(_)) => false,
            ShellError::Process(_) => true,
            _ => false,
        }
    }
}

impl From<rustyline::error::ReadlineError> for ShellError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        ShellError::Readline(err)
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        ShellError::Io(err)
    }
}

impl From<ExpandError> for ShellError {
    fn from(err: ExpandError) -> Self {
        ShellError::Expand(err)
    }
}

impl From<ParseError> for ShellError {
    fn from(err: ParseError) -> Self {
        ShellError::Parse(err)
    }
}

impl From<CommandError> for ShellError {
    fn from(err: CommandError) -> Self {
        ShellError::Command(err)
    }
}

impl From<ProcessError> for ShellError {
    fn from(err: ProcessError) -> Self {
        ShellError::Process(err)
    }
}

impl From<ConfigError> for ShellError {
    fn from(err: ConfigError) -> Self {
        ShellError::Config(err)
    }
}

impl From<log::SetLoggerError> for ShellError {
    fn from(err: log::SetLoggerError) -> Self {
        ShellError::Logger(err)
    }
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellError::Readline(e) => write!(f, "Readline error: {}", e),
            ShellError::Io(e) => write!(f, "IO error: {}", e),
            ShellError::Expand(e) => write!(f, "{}", e),
            ShellError::Parse(e) => write!(f, "{}", e),
            ShellError::Command(e) => write!(f, "{}", e),
            ShellError::Process(e) => write!(f, "{}", e),
            ShellError::Config(e) => write!(f, "Config error: {}", e),
            ShellError::FlagError(msg) => write!(f, "Flag error: {}", msg),
            ShellError::Logger(e) => write!(f, "Logger error: {}", e),
        }
    }
}

impl std::error::Error for ShellError {}
