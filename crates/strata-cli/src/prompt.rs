//! Interactive prompts

use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, Write};

/// Source of answers for interactive questions
pub trait Prompt {
    /// Ask a visible question; an empty answer takes `default` when given
    fn ask(&mut self, label: &str, default: Option<&str>) -> io::Result<String>;

    /// Ask for a secret without echoing it
    fn ask_secret(&mut self, label: &str) -> io::Result<String>;
}

/// Prompts on the controlling terminal
///
/// When stdin is not a terminal (piped input) secrets are read as plain
/// lines from stdin as well.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read_line(&self) -> io::Result<String> {
        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(input.trim().to_string())
    }
}

impl Prompt for TerminalPrompt {
    fn ask(&mut self, label: &str, default: Option<&str>) -> io::Result<String> {
        match default {
            Some(default) => print!("{} [{}]: ", label.bold(), default),
            None => print!("{}: ", label.bold()),
        }
        io::stdout().flush()?;

        let answer = self.read_line()?;
        Ok(match default {
            Some(default) if answer.is_empty() => default.to_string(),
            _ => answer,
        })
    }

    fn ask_secret(&mut self, label: &str) -> io::Result<String> {
        if io::stdin().is_terminal() {
            return rpassword::prompt_password(format!("{}: ", label.bold()))
                .map(|secret| secret.trim().to_string());
        }

        print!("{}: ", label.bold());
        io::stdout().flush()?;
        self.read_line()
    }
}
