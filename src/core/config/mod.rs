use std::fmt;
use std::path::PathBuf;

use log::LevelFilter;

use super::env::EnvLookup;
use crate::flags::Flags;
use crate::shell::parser::{DEFAULT_DELIMITERS, DEFAULT_MAX_WORDS};

/// Startup settings drawn from the command line and the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub prompt: String,
    pub delimiters: String,
    pub home: Option<PathBuf>,
    pub max_words: usize,
    pub log_level: LevelFilter,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            delimiters: DEFAULT_DELIMITERS.to_string(),
            home: None,
            max_words: DEFAULT_MAX_WORDS,
            log_level: LevelFilter::Warn,
        }
    }
}

impl ShellConfig {
    pub fn load(flags: &Flags, env: &dyn EnvLookup) -> Result<Self, ConfigError> {
        let max_words = match flags.get_value("max-words") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidMaxWords(raw.clone())),
            },
            None => DEFAULT_MAX_WORDS,
        };

        let log_level = if flags.is_set("quiet") {
            LevelFilter::Off
        } else if flags.is_set("debug") {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        };

        Ok(Self {
            prompt: env.var("PS1").unwrap_or_default(),
            delimiters: env
                .var("IFS")
                .unwrap_or_else(|| DEFAULT_DELIMITERS.to_string()),
            home: env.home_dir(),
            max_words,
            log_level,
        })
    }

    /// Home directory as text for `~/` expansion; empty when unknown.
    pub fn home_str(&self) -> String {
        self.home
            .as_ref()
            .map(|home| home.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidMaxWords(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidMaxWords(raw) => {
                write!(f, "invalid word limit {:?}: expected a positive integer", raw)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
