//! Check result reporting
//!
//! One check message maps to one prefixed, colored line: red for failures,
//! yellow for outdated modules, green for applied updates and cyan for
//! routine outcomes. Debug lines only appear in verbose mode. Results are
//! sorted by module path so concurrent checks print deterministically.

use crate::domain::{CheckMessage, Level};
use colored::Colorize;
use std::io::{self, Write};

/// Prefix of every printed line
pub const PREFIX: &str = "modup: ";

/// Writes check messages as colored lines
pub struct Printer<W> {
    out: W,
    verbose: bool,
}

impl<W: Write> Printer<W> {
    /// Creates a printer over the given writer
    pub fn new(out: W, verbose: bool) -> Self {
        Printer { out, verbose }
    }

    /// Prints the messages of one manifest, ordered by module path
    pub fn print_all(&mut self, messages: &[CheckMessage]) -> io::Result<()> {
        let mut sorted: Vec<&CheckMessage> = messages.iter().collect();
        sorted.sort_by_key(|m| m.module().to_string());
        for msg in sorted {
            self.print(msg)?;
        }
        Ok(())
    }

    /// Prints a single message, unless verbosity filters it out
    pub fn print(&mut self, msg: &CheckMessage) -> io::Result<()> {
        if msg.level() == Level::Debug && !self.verbose {
            return Ok(());
        }
        let line = msg.to_string();
        let line = match msg.level() {
            Level::Error => line.red(),
            Level::Warn => line.bright_yellow(),
            Level::Info => line.green(),
            Level::Debug => line.cyan(),
        };
        writeln!(self.out, "{}{}", PREFIX, line)
    }
}

/// Returns true when any message should drive a non-zero exit
pub fn failed(messages: &[CheckMessage]) -> bool {
    messages.iter().any(CheckMessage::is_bad)
}
