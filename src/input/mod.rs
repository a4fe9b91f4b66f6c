use std::io::{self, BufRead, IsTerminal, Write};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::ShellError;

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl-C typed at an interactive prompt.
    Interrupted,
    Eof,
}

/// Where command lines come from: a line editor on a terminal, plain
/// buffered stdin otherwise.
pub enum LineReader {
    Interactive(Box<DefaultEditor>),
    Piped(Box<dyn BufRead>),
}

impl LineReader {
    pub fn from_stdin() -> Result<Self, ShellError> {
        if io::stdin().is_terminal() {
            Ok(LineReader::Interactive(Box::new(DefaultEditor::new()?)))
        } else {
            Ok(LineReader::Piped(Box::new(io::stdin().lock())))
        }
    }

    #[cfg(test)]
    pub(crate) fn from_reader(reader: impl BufRead + 'static) -> Self {
        LineReader::Piped(Box::new(reader))
    }

    /// Shows `prompt` and blocks for one line, without its trailing newline.
    pub fn read_line(&mut self, prompt: &str) -> Result<Input, ShellError> {
        match self {
            LineReader::Interactive(editor) => match editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(e) = editor.add_history_entry(line.as_str()) {
                            log::warn!("couldn't add to history: {}", e);
                        }
                    }
                    Ok(Input::Line(line))
                }
                Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
                Err(ReadlineError::Eof) => Ok(Input::Eof),
                Err(e) => Err(e.into()),
            },
            LineReader::Piped(reader) => {
                let mut stdout = io::stdout();
                write!(stdout, "{}", prompt)?;
                stdout.flush()?;

                let mut line = String::new();
                if reader.read_line(&mut line)? == 0 {
                    return Ok(Input::Eof);
                }
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Ok(Input::Line(line))
            }
        }
    }
}
