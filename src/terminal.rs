//! Presenter that asks on the terminal

use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::check::alert::AlertButton;
use crate::check::presenter::{Presenter, UpdatePrompt, UserChoice};

/// Prints the prompt to stdout and reads the choice from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn present(&self, prompt: &UpdatePrompt) -> UserChoice {
        let stdin = io::stdin();
        let mut input = stdin.lock();

        loop {
            print!("{}", render_prompt(prompt));
            if let Err(e) = io::stdout().flush() {
                warn!("Failed to flush prompt: {}", e);
            }

            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) => return default_choice(prompt),
                Ok(_) => {
                    if let Some(choice) = parse_choice(&line, prompt) {
                        return choice;
                    }
                    println!("Please enter one of the listed numbers.");
                }
                Err(e) => {
                    warn!("Failed to read choice: {}", e);
                    return default_choice(prompt);
                }
            }
        }
    }
}

/// Title, message and numbered buttons followed by an input marker
pub fn render_prompt(prompt: &UpdatePrompt) -> String {
    let mut out = format!("\n{}\n{}\n", prompt.title, prompt.message);
    for (i, (_, label)) in prompt.buttons.iter().enumerate() {
        out.push_str(&format!("  [{}] {}\n", i + 1, label));
    }
    out.push_str("> ");
    out
}

/// Map a 1-based button number to its choice
pub fn parse_choice(input: &str, prompt: &UpdatePrompt) -> Option<UserChoice> {
    let index = input.trim().parse::<usize>().ok()?.checked_sub(1)?;
    prompt
        .buttons
        .get(index)
        .map(|(button, _)| UserChoice::from(*button))
}

/// Choice used when stdin is closed
fn default_choice(prompt: &UpdatePrompt) -> UserChoice {
    if prompt.directive.allows(AlertButton::Dismiss) {
        UserChoice::Dismiss
    } else {
        UserChoice::Update
    }
}
