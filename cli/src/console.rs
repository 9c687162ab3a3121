//! User prompts, confirmations, alerts and notices.
//!
//! [`Console`] is the modal input channel: free-text prompts that can be
//! cancelled, yes/no confirmations for destructive actions, alerts for
//! rejected input and plain notices for everything else. [`TerminalConsole`] talks to a line-based terminal;
//! [`ScriptedConsole`] replays canned answers and records everything shown,
//! for tests and non-interactive drivers.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::render::Frame;

/// Modal input and output primitives.
pub trait Console {
    /// Asks for a line of text. `default` is offered as the pre-filled
    /// answer. Returns `None` if the user cancelled.
    fn prompt(&mut self, message: &str, default: Option<&str>) -> Option<String>;

    /// Asks a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;

    /// Reports rejected input or a failed operation.
    fn alert(&mut self, message: &str);

    /// Prints an informational line such as help text or a confirmation
    /// that something was saved.
    fn notice(&mut self, message: &str);

    /// Shows a freshly rendered frame.
    fn present(&mut self, frame: &Frame);
}

/// Choice made after selecting a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    Edit,
    Delete,
    Cancel,
}

impl HeaderAction {
    /// Interprets the answer to the action prompt: `"1"` edits, `"2"`
    /// deletes, anything else (including a cancelled prompt) cancels.
    pub fn parse(answer: Option<&str>) -> Self {
        match answer.map(str::trim) {
            Some("1") => Self::Edit,
            Some("2") => Self::Delete,
            _ => Self::Cancel,
        }
    }
}

/// Console over a line reader and a writer.
///
/// End of input cancels a prompt and declines a confirmation. Pressing
/// enter on a prompt with a default accepts the default.
pub struct TerminalConsole<R, W> {
    input: R,
    output: W,
}

impl TerminalConsole<io::StdinLock<'static>, io::Stdout> {
    /// Console over the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consumes the console and returns the writer.
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl<R: BufRead, W: Write> Console for TerminalConsole<R, W> {
    fn prompt(&mut self, message: &str, default: Option<&str>) -> Option<String> {
        let _ = match default {
            Some(d) => write!(self.output, "{message} [{d}] "),
            None => write!(self.output, "{message} "),
        };
        let _ = self.output.flush();
        let line = self.read_line()?;
        match default {
            Some(d) if line.is_empty() => Some(d.to_string()),
            _ => Some(line),
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        let _ = write!(self.output, "{message} [y/N] ");
        let _ = self.output.flush();
        self.read_line()
            .map(|l| matches!(l.trim(), "y" | "Y" | "yes" | "Yes" | "YES"))
            .unwrap_or(false)
    }

    fn alert(&mut self, message: &str) {
        let _ = writeln!(self.output, "! {message}");
    }

    fn notice(&mut self, message: &str) {
        let _ = writeln!(self.output, "{message}");
    }

    fn present(&mut self, frame: &Frame) {
        let _ = writeln!(self.output, "\n{}", frame.to_text());
    }
}

/// Console that answers from queues and records what it was shown.
///
/// Prompts take answers in order (`None` entries cancel); an exhausted
/// queue cancels. Confirmations likewise, declining when exhausted.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<Option<String>>,
    confirmations: VecDeque<bool>,
    /// Messages of every prompt, in order.
    pub prompts: Vec<String>,
    /// Every alert, in order.
    pub alerts: Vec<String>,
    /// Every notice, in order.
    pub notices: Vec<String>,
    /// Every presented frame.
    pub frames: Vec<Frame>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a prompt answer.
    pub fn answer(mut self, text: &str) -> Self {
        self.answers.push_back(Some(text.to_string()));
        self
    }

    /// Queues a cancelled prompt.
    pub fn cancel(mut self) -> Self {
        self.answers.push_back(None);
        self
    }

    /// Queues a confirmation result.
    pub fn confirm_with(mut self, yes: bool) -> Self {
        self.confirmations.push_back(yes);
        self
    }

    /// Queues more answers on an existing console.
    pub fn push_answer(&mut self, text: &str) {
        self.answers.push_back(Some(text.to_string()));
    }

    /// Queues a confirmation on an existing console.
    pub fn push_confirmation(&mut self, yes: bool) {
        self.confirmations.push_back(yes);
    }

    /// The most recently presented frame.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl Console for ScriptedConsole {
    fn prompt(&mut self, message: &str, _default: Option<&str>) -> Option<String> {
        self.prompts.push(message.to_string());
        self.answers.pop_front().flatten()
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.confirmations.pop_front().unwrap_or(false)
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn present(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }
}
