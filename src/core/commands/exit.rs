use super::{BuiltinContext, Command, CommandError, Outcome};

#[derive(Clone)]
pub struct ExitCommand;

impl Default for ExitCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ExitCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for ExitCommand {
    fn execute(&self, args: &[String], ctx: &BuiltinContext<'_>) -> Result<Outcome, CommandError> {
        match args {
            [] => Ok(Outcome::Exit {
                code: ctx.state.last_status(),
                explicit: false,
            }),
            [code] => {
                if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(CommandError::InvalidArguments(
                        "second command must be integer",
                    ));
                }
                let code = code
                    .parse::<i32>()
                    .map_err(|_| CommandError::InvalidArguments("second command must be integer"))?;
                Ok(Outcome::Exit {
                    code,
                    explicit: true,
                })
            }
            _ => Err(CommandError::InvalidArguments("too many arguments")),
        }
    }
}
