//! Line-oriented prompts for interactive input
//!
//! Generic over the reader and writer so the flows can be driven from
//! in-memory buffers in tests.

use std::io::{BufRead, Write};

use crate::error::{ExpenseError, ExpenseResult};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask once and return the trimmed answer, or `default` for an empty one.
    ///
    /// Fails when the input is closed before an answer is given.
    pub fn ask(&mut self, label: &str, default: Option<&str>) -> ExpenseResult<String> {
        match default {
            Some(d) if !d.is_empty() => write!(self.output, "{} [{}]: ", label, d)?,
            _ => write!(self.output, "{}: ", label)?,
        }
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ExpenseError::Validation(format!(
                "No input for '{}'",
                label
            )));
        }

        let answer = line.trim();
        Ok(match (answer.is_empty(), default) {
            (true, Some(d)) => d.to_string(),
            _ => answer.to_string(),
        })
    }

    /// Ask until `parse` accepts the answer.
    ///
    /// Recoverable errors are shown and the question is repeated; anything
    /// else (including closed input) is returned.
    pub fn ask_with<T, F>(&mut self, label: &str, default: Option<&str>, parse: F) -> ExpenseResult<T>
    where
        F: Fn(&str) -> ExpenseResult<T>,
    {
        loop {
            let answer = self.ask(label, default)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_recoverable() => writeln!(self.output, "  {}", e)?,
                Err(e) => return Err(e),
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_ask_uses_default_for_empty_answer() {
        let mut p = prompter("\n  Lunch  \n");
        assert_eq!(p.ask("Currency", Some("INR")).unwrap(), "INR");
        assert_eq!(p.ask("Note", None).unwrap(), "Lunch");

        let output = String::from_utf8(p.into_output()).unwrap();
        assert!(output.contains("Currency [INR]: "));
        assert!(output.contains("Note: "));
    }

    #[test]
    fn test_ask_with_repeats_until_valid() {
        let mut p = prompter("abc\n-3\n42\n");
        let value = p
            .ask_with("Amount", None, |s| {
                let n: i64 = s
                    .parse()
                    .map_err(|_| ExpenseError::Validation(format!("'{}' is not a number", s)))?;
                if n <= 0 {
                    return Err(ExpenseError::Validation("must be positive".into()));
                }
                Ok(n)
            })
            .unwrap();
        assert_eq!(value, 42);

        let output = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(output.matches("Amount: ").count(), 3);
        assert!(output.contains("'abc' is not a number"));
        assert!(output.contains("must be positive"));
    }

    #[test]
    fn test_unrecoverable_error_is_returned() {
        let mut p = prompter("x\n");
        let err = p
            .ask_with("Value", None, |_| -> ExpenseResult<()> {
                Err(ExpenseError::Storage("disk full".into()))
            })
            .unwrap_err();
        assert!(matches!(err, ExpenseError::Storage(_)));
    }

    #[test]
    fn test_closed_input_fails() {
        let mut p = prompter("");
        assert!(p.ask("Amount", Some("1")).is_err());
    }
}
