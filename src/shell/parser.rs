use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_DELIMITERS: &str = " \t\n";
pub const DEFAULT_MAX_WORDS: usize = 512;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    MissingRedirectTarget,
    TooManyWords(usize),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingRedirectTarget => write!(f, "no file to redirect input/output"),
            ParseError::TooManyWords(max) => write!(f, "too many words (limit {})", max),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub args: Vec<String>,
    pub redirect: Redirection,
    pub background: bool,
}

impl ParsedCommand {
    pub fn name(&self) -> &str {
        // `args` is never empty for a command produced by the tokenizer.
        self.args.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    delimiters: Vec<char>,
    max_words: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITERS, DEFAULT_MAX_WORDS)
    }
}

impl Tokenizer {
    pub fn new(delimiters: &str, max_words: usize) -> Self {
        Self {
            delimiters: delimiters.chars().collect(),
            max_words,
        }
    }

    fn tokens<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        line.split(move |c: char| self.delimiters.contains(&c))
            .filter(|token| !token.is_empty())
    }

    /// Splits an expanded line into a command. `Ok(None)` means the line
    /// held no words (blank, or only a comment).
    pub fn parse(&self, line: &str) -> Result<Option<ParsedCommand>, ParseError> {
        let mut args = Vec::new();
        let mut redirect = Redirection::default();
        let mut background = false;

        let mut tokens = self.tokens(line);
        while let Some(token) = tokens.next() {
            match token {
                "<" | ">" => {
                    let target = tokens.next().ok_or(ParseError::MissingRedirectTarget)?;
                    let slot = if token == "<" {
                        &mut redirect.input
                    } else {
                        &mut redirect.output
                    };
                    *slot = Some(PathBuf::from(target));
                }
                "&" => background = true,
                "#" => break,
                word => {
                    if args.len() >= self.max_words {
                        return Err(ParseError::TooManyWords(self.max_words));
                    }
                    args.push(word.to_string());
                }
            }
        }

        if args.is_empty() {
            return Ok(None);
        }

        Ok(Some(ParsedCommand {
            args,
            redirect,
            background,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ParsedCommand {
        Tokenizer::default().parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_output_redirect() {
        let cmd = parse("ls -l > out.txt");
        assert_eq!(cmd.args, vec!["ls", "-l"]);
        assert_eq!(cmd.redirect.output, Some(PathBuf::from("out.txt")));
        assert_eq!(cmd.redirect.input, None);
        assert!(!cmd.background);
    }

    #[test]
    fn test_background() {
        let cmd = parse("sleep 1 &");
        assert_eq!(cmd.args, vec!["sleep", "1"]);
        assert!(cmd.background);
    }

    #[test]
    fn test_both_redirects() {
        let cmd = parse("sort < in.txt > out.txt &\n");
        assert_eq!(cmd.args, vec!["sort"]);
        assert_eq!(cmd.redirect.input, Some(PathBuf::from("in.txt")));
        assert_eq!(cmd.redirect.output, Some(PathBuf::from("out.txt")));
        assert!(cmd.background);
    }

    #[test]
    fn test_ampersand_does_not_end_parsing() {
        let cmd = parse("echo a & b");
        assert_eq!(cmd.args, vec!["echo", "a", "b"]);
        assert!(cmd.background);
    }

    #[test]
    fn test_comment() {
        let cmd = parse("echo hi # > ignored &");
        assert_eq!(cmd.args, vec!["echo", "hi"]);
        assert_eq!(cmd.redirect, Redirection::default());
        assert!(!cmd.background);
    }

    #[test]
    fn test_operators_only_as_whole_tokens() {
        let cmd = parse("echo a>b c&");
        assert_eq!(cmd.args, vec!["echo", "a>b", "c&"]);
        assert!(!cmd.background);
    }

    #[test]
    fn test_blank_and_comment_lines() {
        let tokenizer = Tokenizer::default();
        assert_eq!(tokenizer.parse(""), Ok(None));
        assert_eq!(tokenizer.parse(" \t \n"), Ok(None));
        assert_eq!(tokenizer.parse("# just a note"), Ok(None));
    }

    #[test]
    fn test_missing_redirect_target() {
        let tokenizer = Tokenizer::default();
        assert_eq!(
            tokenizer.parse("cat <"),
            Err(ParseError::MissingRedirectTarget)
        );
        assert_eq!(
            tokenizer.parse("ls >   "),
            Err(ParseError::MissingRedirectTarget)
        );
    }

    #[test]
    fn test_custom_delimiters() {
        let tokenizer = Tokenizer::new(":", DEFAULT_MAX_WORDS);
        let cmd = tokenizer.parse("echo:a b:>:f").unwrap().unwrap();
        assert_eq!(cmd.args, vec!["echo", "a b"]);
        assert_eq!(cmd.redirect.output, Some(PathBuf::from("f")));
    }

    #[test]
    fn test_word_limit() {
        let tokenizer = Tokenizer::new(DEFAULT_DELIMITERS, 2);
        assert!(tokenizer.parse("a b > f &").unwrap().is_some());
        assert_eq!(tokenizer.parse("a b c"), Err(ParseError::TooManyWords(2)));
    }
}
