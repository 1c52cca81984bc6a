//! Interactive terminal front-end
//!
//! Numbered options on stdout, answers read from stdin. Always available;
//! this is the fallback at the end of the discovery priority list.

use std::io::{self, BufRead, Write};

use super::{Answer, Frontend};
use crate::error::SetupError;

pub struct LineFrontend;

impl Frontend for LineFrontend {
    fn ask(&self, prompt: &str, options: &[String]) -> Result<Answer, SetupError> {
        let stdin = io::stdin();
        loop {
            println!("{prompt}");
            for (index, option) in options.iter().enumerate() {
                println!("{index}. {option}");
            }
            println!("Enter 'c' to cancel.");
            print!("> ");
            io::stdout().flush()?;

            let mut input = String::new();
            if stdin.lock().read_line(&mut input)? == 0 {
                // stdin closed; treat like a cancel
                return Ok(Answer::Cancelled);
            }
            let input = input.trim();
            if input == "c" {
                return Ok(Answer::Cancelled);
            }
            if let Ok(index) = input.parse::<usize>()
                && index < options.len()
            {
                return Ok(Answer::Choice(index));
            }
            println!("invalid answer: '{input}'");
        }
    }

    fn report_error(&self, message: &str) {
        eprintln!("{message}");
    }
}
