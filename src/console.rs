//! Terminal boundary. Everything the menus read or print goes through
//! [`Console`] so handlers can run against a scripted session in tests.

use std::io::{self, BufRead, Write};

use inquire::{Password, PasswordDisplayMode};

use crate::errors::AppError;

pub trait Console {
    /// Prints `prompt` and returns the next line without its line ending.
    fn read_line(&mut self, prompt: &str) -> Result<String, AppError>;

    /// Like [`Console::read_line`] but without echoing what is typed.
    fn read_secret(&mut self, prompt: &str) -> Result<String, AppError>;

    fn print(&mut self, text: &str);
}

pub struct Terminal {
    stdin: io::Stdin,
}

impl Terminal {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Console for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<String, AppError> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        let read = self.stdin.lock().read_line(&mut line)?;
        if read == 0 {
            return Err(AppError::Input("standard input closed".to_string()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String, AppError> {
        let secret = Password::new(prompt)
            .with_display_mode(PasswordDisplayMode::Hidden)
            .without_confirmation()
            .prompt()?;
        Ok(secret)
    }

    fn print(&mut self, text: &str) {
        println!("{}", text);
    }
}

#[cfg(test)]
pub use scripted::ScriptedConsole;
