//! Parsing of the text event stream. The grammar mirrors the five abstract
//! events of the shell: movement steps, caller selection, calls, the
//! view-only depth change, and quit. Blank lines and `#` comments are
//! ignored; a malformed line is an error the shell reports and skips.

use std::error::Error;
use std::fmt;

/// One shell event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Displace a phone one step along the axes; dx and dy are -1, 0 or 1.
    Move {
        /// The phone to displace
        phone: String,
        /// East-west step
        dx: i8,
        /// North-south step
        dy: i8,
    },
    /// Make a phone the caller for subsequent `call` events.
    Select(String),
    /// The selected phone calls this callee.
    Call(String),
    /// Change the visualization depth; no core state is touched.
    SetDepth(usize),
    /// Terminate and write the report.
    Quit,
}

/// A line that did not parse.
#[derive(Debug)]
pub struct ParseEventError {
    line: String,
    reason: &'static str,
}

impl ParseEventError {
    fn new(line: &str, reason: &'static str) -> ParseEventError {
        ParseEventError {
            line: line.trim().to_string(),
            reason,
        }
    }
}

impl fmt::Display for ParseEventError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "bad event line {:?}: {}", self.line, self.reason)
    }
}

impl Error for ParseEventError {}

fn step(token: Option<&str>, line: &str) -> Result<i8, ParseEventError> {
    match token {
        Some("-1") => Ok(-1),
        Some("0") => Ok(0),
        Some("1") => Ok(1),
        Some(_) => Err(ParseEventError::new(line, "steps must be -1, 0 or 1")),
        None => Err(ParseEventError::new(line, "move needs two steps")),
    }
}

impl Event {
    /// Parses one line of the event stream. Blank lines and comments parse
    /// to `None`.
    pub fn parse(line: &str) -> Result<Option<Event>, ParseEventError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        let mut parts = trimmed.split_whitespace();
        let verb = parts.next().unwrap_or("").to_ascii_lowercase();
        let event = match verb.as_str() {
            "move" => {
                let phone = parts
                    .next()
                    .ok_or_else(|| ParseEventError::new(line, "move needs a phone id"))?
                    .to_string();
                let dx = step(parts.next(), line)?;
                let dy = step(parts.next(), line)?;
                Event::Move { phone, dx, dy }
            }
            "select" => Event::Select(
                parts
                    .next()
                    .ok_or_else(|| ParseEventError::new(line, "select needs a phone id"))?
                    .to_string(),
            ),
            "call" => Event::Call(
                parts
                    .next()
                    .ok_or_else(|| ParseEventError::new(line, "call needs a callee id"))?
                    .to_string(),
            ),
            "depth" => {
                let depth = parts
                    .next()
                    .ok_or_else(|| ParseEventError::new(line, "depth needs a level"))?
                    .parse::<usize>()
                    .map_err(|_| ParseEventError::new(line, "depth must be a small integer"))?;
                Event::SetDepth(depth)
            }
            "quit" | "exit" => Event::Quit,
            _ => return Err(ParseEventError::new(line, "unrecognized event")),
        };
        if parts.next().is_some() {
            return Err(ParseEventError::new(line, "trailing tokens"));
        }
        Ok(Some(event))
    }
}
