//! Interactive first-run prompts

use super::ConfigError;
use std::io::{self, BufRead, IsTerminal, Write};

/// Source of interactively entered values
pub trait Prompter {
    /// Show `label` and read one line. `Ok(None)` means input ended.
    /// `hidden` asks for the input not to be echoed.
    fn read_value(&mut self, label: &str, hidden: bool) -> io::Result<Option<String>>;
}

/// Ask until a non-empty value is entered. There is no timeout.
pub fn prompt_until_value<P: Prompter + ?Sized>(
    prompter: &mut P,
    label: &str,
    hidden: bool,
) -> Result<String, ConfigError> {
    loop {
        let value = prompter
            .read_value(label, hidden)
            .map_err(|e| ConfigError::PromptAborted(format!("{}: {}", label, e)))?
            .ok_or_else(|| ConfigError::PromptAborted(format!("{} (end of input)", label)))?;

        let value = value.trim();
        if !value.is_empty() {
            return Ok(value.to_string());
        }
    }
}

/// Prompts on stderr and reads stdin. Secrets are read without echo when
/// stdin is a terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn read_value(&mut self, label: &str, hidden: bool) -> io::Result<Option<String>> {
        eprint!("{} ", label);
        io::stderr().flush()?;

        if hidden && io::stdin().is_terminal() {
            return rpassword::read_password().map(Some);
        }

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Prompter over any reader and writer
pub struct StreamPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompter for StreamPrompter<R, W> {
    fn read_value(&mut self, label: &str, _hidden: bool) -> io::Result<Option<String>> {
        write!(self.output, "{} ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}
