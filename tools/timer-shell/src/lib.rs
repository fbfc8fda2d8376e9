//! Line-oriented front end for the timer console.
//!
//! Reads one command per line, splits it on whitespace and hands it to the
//! dispatch table. Blank lines and lines starting with `#` are skipped so the
//! same loop can replay script files.

mod config;

use std::io::{self, BufRead, Write};

use periph_timer::{execute, Dispatch, TimerTester};

pub use config::{ShellConfig, TimerSection};

/// Banner printed once before the first prompt.
pub const BANNER: &str = "Start: Test for the timer API";

/// Counters collected over one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub commands: usize,
    pub failures: usize,
    pub last_status: i32,
}

pub struct Console<'a> {
    tester: &'a TimerTester,
    echo: bool,
    prompt: bool,
}

impl<'a> Console<'a> {
    pub fn new(tester: &'a TimerTester) -> Self {
        Self {
            tester,
            echo: false,
            prompt: false,
        }
    }

    /// Repeat each command before its output.
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Print `> ` before reading each line.
    pub fn prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    /// Runs until `input` is exhausted. Command failures never end the
    /// session; only I/O errors do.
    pub fn run<R: BufRead, W: Write>(&self, input: R, out: &mut W) -> io::Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        let mut lines = input.lines();
        loop {
            if self.prompt {
                write!(out, "> ")?;
                out.flush()?;
            }
            let Some(line) = lines.next() else { break };
            if let Some(status) = self.run_line(&line?, out)? {
                summary.commands += 1;
                summary.last_status = status;
                if status != 0 {
                    summary.failures += 1;
                }
            }
        }
        Ok(summary)
    }

    /// Executes one line. Returns `None` for lines that hold no command.
    pub fn run_line<W: Write>(&self, line: &str, out: &mut W) -> io::Result<Option<i32>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        if self.echo {
            writeln!(out, "> {line}")?;
        }

        let argv: Vec<&str> = line.split_whitespace().collect();
        let status = match execute(self.tester, &argv, out)? {
            Dispatch::Completed(status) => status,
            Dispatch::NotFound(name) => {
                writeln!(out, "shell: command not found: {name}")?;
                1
            }
        };
        out.flush()?;
        Ok(Some(status))
    }
}
