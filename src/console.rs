//! Blocking input/output primitives the screens are built on.

use std::collections::VecDeque;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password};
use thiserror::Error;

use crate::Amount;

/// Failure to read from the operator.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("terminal error: {0}")]
    Terminal(#[from] dialoguer::Error),

    #[error("no more scripted input")]
    Exhausted,
}

/// Where screens read answers from and print to.
pub trait Console {
    /// Show `prompt` and read one line of text.
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError>;

    /// Read a password or PIN; terminals do not echo it.
    fn read_secret(&mut self, prompt: &str) -> Result<String, InputError> {
        self.read_line(prompt)
    }

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &str) -> Result<bool, InputError>;

    fn print(&mut self, message: &str);
}

/// Interactive console on the process terminal.
pub struct TerminalConsole {
    theme: ColorfulTheme,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        let line = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(line)
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String, InputError> {
        let secret = Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?;
        Ok(secret)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool, InputError> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .interact()?;
        Ok(answer)
    }

    fn print(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Console fed from a queue of answers, capturing everything shown.
///
/// Confirmations take the next answer and accept anything starting with `y`.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            output: Vec::new(),
        }
    }

    pub fn push(&mut self, answer: impl Into<String>) {
        self.answers.push_back(answer.into());
    }

    pub fn is_exhausted(&self) -> bool {
        self.answers.is_empty()
    }

    /// Prompts and messages in the order they were shown.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Whether any shown line contains `needle`.
    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }

    fn next_answer(&mut self, prompt: &str) -> Result<String, InputError> {
        self.output.push(prompt.to_string());
        self.answers.pop_front().ok_or(InputError::Exhausted)
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        self.next_answer(prompt)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool, InputError> {
        let answer = self.next_answer(prompt)?;
        Ok(answer.trim().to_ascii_lowercase().starts_with('y'))
    }

    fn print(&mut self, message: &str) {
        self.output.push(message.to_string());
    }
}

/// Read a menu choice, re-prompting until it falls within `min..=max`.
pub fn read_number_between(
    console: &mut dyn Console,
    prompt: &str,
    min: u8,
    max: u8,
) -> Result<u8, InputError> {
    let mut line = console.read_line(prompt)?;
    loop {
        match line.trim().parse::<u8>() {
            Ok(choice) if (min..=max).contains(&choice) => return Ok(choice),
            _ => line = console.read_line(&format!("Enter a number from {min} to {max}"))?,
        }
    }
}

/// Read any amount, re-prompting until the text parses.
pub fn read_amount(console: &mut dyn Console, prompt: &str) -> Result<Amount, InputError> {
    let mut line = console.read_line(prompt)?;
    loop {
        match line.parse::<Amount>() {
            Ok(amount) => return Ok(amount),
            Err(e) => {
                console.print(&format!("Invalid input ({e})"));
                line = console.read_line("Please enter a valid number")?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_console_replays_answers() {
        let mut console = ScriptedConsole::new(["first", "y", "no"]);
        assert_eq!(console.read_line("name?").unwrap(), "first");
        assert!(console.confirm("sure?").unwrap());
        assert!(!console.confirm("really?").unwrap());
        assert!(console.is_exhausted());
        assert!(matches!(console.read_line("more?"), Err(InputError::Exhausted)));
    }

    #[test]
    fn scripted_console_captures_output() {
        let mut console = ScriptedConsole::default();
        console.print("hello there");
        assert!(console.printed("hello"));
        assert!(!console.printed("goodbye"));
        assert_eq!(console.output(), ["hello there"]);
    }

    #[test]
    fn number_between_retries_out_of_range() {
        let mut console = ScriptedConsole::new(["0", "abc", "12", "4"]);
        assert_eq!(read_number_between(&mut console, "choice?", 1, 9).unwrap(), 4);
        assert!(console.printed("Enter a number from 1 to 9"));
    }

    #[test]
    fn amount_retries_until_valid() {
        let mut console = ScriptedConsole::new(["ten", "10.5"]);
        assert_eq!(
            read_amount(&mut console, "amount?").unwrap(),
            "10.5".parse::<Amount>().unwrap()
        );
        assert!(console.printed("Invalid input"));
    }
}
