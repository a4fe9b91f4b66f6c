mod vars;

pub use vars::{MapEnv, ProcessEnv};

use std::path::PathBuf;

/// Key to string lookup over the shell's environment.
pub trait EnvLookup {
    fn var(&self, name: &str) -> Option<String>;

    /// `HOME`, falling back to the platform's notion of the home directory.
    fn home_dir(&self) -> Option<PathBuf> {
        self.var("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
    }
}
