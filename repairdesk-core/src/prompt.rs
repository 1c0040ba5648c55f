//! Operator input.
//!
//! Everything that asks the operator a question goes through [`Prompter`],
//! so the interactive flows can be replayed from a script in tests.

use crate::error::RepairDeskError;
use crate::Result;
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// Asks one question and returns the answer line.
pub trait Prompter {
    /// Shows `prompt` and reads one line, without its line terminator.
    ///
    /// # Errors
    /// Returns [`RepairDeskError::Prompt`] on I/O failure or end of input.
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        (**self).ask(prompt)
    }
}

/// Line-oriented prompter over any reader and writer.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

/// The terminal prompter used by the binary.
pub type StdinPrompter = LinePrompter<std::io::StdinLock<'static>, std::io::Stdout>;

impl StdinPrompter {
    /// Prompts on stdout and reads from stdin.
    pub fn stdin() -> Self {
        LinePrompter::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    /// Reads answers from `input` and writes prompts to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Gives back the writer, e.g. to inspect what was printed.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)
            .and_then(|_| self.output.flush())
            .map_err(|e| RepairDeskError::prompt_failed("scrittura del prompt", e))?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| RepairDeskError::prompt_failed("lettura dello standard input", e))?;
        if read == 0 {
            return Err(end_of_input());
        }

        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(line)
    }
}

fn end_of_input() -> RepairDeskError {
    RepairDeskError::prompt_failed(
        "input terminato",
        std::io::Error::from(std::io::ErrorKind::UnexpectedEof),
    )
}

/// Replays canned answers and records every prompt it was shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedPrompter {
    /// Replays `answers` in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Whether any prompt so far contained `fragment`.
    pub fn was_asked(&self, fragment: &str) -> bool {
        self.prompts.iter().any(|p| p.contains(fragment))
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(end_of_input)
    }
}
