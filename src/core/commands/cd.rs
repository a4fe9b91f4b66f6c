use super::{BuiltinContext, Command, CommandError, Outcome};
use std::env;
use std::path::PathBuf;

#[derive(Clone, Default)]
pub struct CdCommand;

impl CdCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for CdCommand {
    fn execute(&self, args: &[String], ctx: &BuiltinContext<'_>) -> Result<Outcome, CommandError> {
        let target = match args.first() {
            Some(path) => PathBuf::from(path),
            None => ctx
                .home
                .map(|home| home.to_path_buf())
                .ok_or(CommandError::HomeDirNotFound)?,
        };

        env::set_current_dir(&target).map_err(|e| {
            log::debug!("cd {}: {}", target.display(), e);
            CommandError::ChangeDirectory(e)
        })?;
        Ok(Outcome::Status(0))
    }
}
