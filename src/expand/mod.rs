mod substitute;

pub use substitute::substitute;

use std::collections::TryReserveError;
use std::fmt;

#[derive(Debug)]
pub enum ExpandError {
    AllocationFailed(TryReserveError),
}

impl fmt::Display for ExpandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpandError::AllocationFailed(e) => write!(f, "expansion failed: {}", e),
        }
    }
}

impl std::error::Error for ExpandError {}

impl From<TryReserveError> for ExpandError {
    fn from(e: TryReserveError) -> Self {
        ExpandError::AllocationFailed(e)
    }
}

/// Values the expansion tokens resolve to for one input line.
#[derive(Debug, Clone)]
pub struct ExpansionContext<'a> {
    pub home: &'a str,
    pub shell_pid: u32,
    pub last_status: i32,
    pub last_background: Option<i32>,
}

/// Rewrites `~/`, `$$`, `$?` and `$!` in that order, one forward pass each.
pub fn expand(line: &str, ctx: &ExpansionContext<'_>) -> Result<String, ExpandError> {
    // "~/" becomes "~//" first so the home path can take the place of "~/"
    // while the trailing slash survives.
    let text = substitute(line.to_string(), "~/", "~//")?;
    let text = substitute(text, "~/", ctx.home)?;

    let text = substitute(text, "$$", &ctx.shell_pid.to_string())?;
    let text = substitute(text, "$?", &ctx.last_status.to_string())?;

    let background = ctx
        .last_background
        .map(|pid| pid.to_string())
        .unwrap_or_default();
    let text = substitute(text, "$!", &background)?;

    Ok(text)
}
