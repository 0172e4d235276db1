//! # Operation Log
//!
//! A request-scoped trace of what the pipeline did: which fonts it resolved,
//! what the request looked like, how many records it saw, how big the canvas
//! and the encoded buffer came out. It travels with the result so the caller
//! can return it as a plain-text diagnostic when something fails.
//!
//! Every line is also forwarded to the `log` facade at debug level.

use std::fmt;

/// Width the stage label is padded to, so the values line up.
const STAGE_WIDTH: usize = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpLog {
    lines: Vec<String>,
}

impl OpLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one `stage : message` line.
    pub fn push(&mut self, stage: &str, message: impl AsRef<str>) {
        let line = format!("{:<width$}: {}", stage, message.as_ref(), width = STAGE_WIDTH);
        log::debug!("{}", line);
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when some line contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    /// The log as CRLF-terminated text, the form served to HTTP clients.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push_str("\r\n");
        }
        out
    }
}

impl fmt::Display for OpLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_is_padded() {
        let mut log = OpLog::new();
        log.push("font", "Arial 36");
        log.push("request", "Table");
        assert_eq!(log.lines()[0], "font   : Arial 36");
        assert_eq!(log.lines()[1], "request: Table");
    }

    #[test]
    fn test_text_uses_crlf() {
        let mut log = OpLog::new();
        log.push("request", "Pie with 4 records");
        log.push("bytes", "12");
        assert_eq!(log.to_text(), "request: Pie with 4 records\r\nbytes  : 12\r\n");
        assert!(log.mentions("12"));
    }
}
