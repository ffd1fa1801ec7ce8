//! External tools as byte filters.
//!
//! Every configured tool (`tools.css`, `tools.js`, `tools.image`,
//! `tools.brotli`) follows the same contract: bytes in on stdin, bytes out
//! on stdout, exit 0 on success.
//!
//! ```ignore
//! let min = Cmd::from_slice(&config.tools.css).stdin(css).run()?;
//! ```

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::{ErrorKind, Write};
use std::process::{Command, Output, Stdio};
use std::sync::LazyLock;
use std::thread;

use anyhow::{Context, Result, bail};
use regex::Regex;

use crate::log;

static ANSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ansi regex"));

/// One external filter invocation.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    input: Vec<u8>,
}

impl Cmd {
    /// `argv[0]` is the program, the rest are passed as arguments.
    pub fn from_slice<S: AsRef<OsStr>>(argv: &[S]) -> Self {
        let (program, args) = match argv.split_first() {
            Some((first, rest)) => (
                first.as_ref().to_owned(),
                rest.iter().map(|a| a.as_ref().to_owned()).collect(),
            ),
            None => (OsString::new(), Vec::new()),
        };
        Self {
            program,
            args,
            input: Vec::new(),
        }
    }

    pub fn stdin(mut self, data: impl AsRef<[u8]>) -> Self {
        self.input = data.as_ref().to_vec();
        self
    }

    /// Run to completion and return stdout.
    pub fn run(self) -> Result<Vec<u8>> {
        let line = self.command_line();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn `{line}`"))?;

        let stdin = child.stdin.take();
        let input = self.input;
        // stdin is fed while stdout/stderr drain; large inputs would
        // otherwise block on a full pipe.
        let (output, written) = thread::scope(|scope| {
            let feeder = scope.spawn(move || match stdin {
                Some(mut pipe) => pipe.write_all(&input),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (output, feeder.join())
        });

        let output = output.with_context(|| format!("Failed to wait for `{line}`"))?;
        if !output.status.success() {
            bail!(failure_message(&line, &output));
        }
        match written {
            Ok(Ok(())) => {}
            // Tools may exit without reading everything.
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => {
                return Err(e).with_context(|| format!("Failed to write stdin of `{line}`"));
            }
            Err(_) => bail!("stdin feeder of `{line}` panicked"),
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let noise: Vec<_> = stderr
            .lines()
            .map(strip_ansi)
            .filter(|l| !l.trim().is_empty())
            .collect();
        if !noise.is_empty() {
            log!(&self.program.to_string_lossy(); "{}", noise.join("\n"));
        }
        Ok(output.stdout)
    }

    fn command_line(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

fn strip_ansi(s: &str) -> Cow<'_, str> {
    ANSI.replace_all(s, "")
}

fn failure_message(line: &str, output: &Output) -> String {
    let mut msg = format!("`{line}` exited with {}", output.status);
    for (label, bytes) in [("stderr", &output.stderr), ("stdout", &output.stdout)] {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim();
        if !text.is_empty() {
            msg.push_str(&format!("\n{label}:\n{}", strip_ansi(text)));
        }
    }
    msg
}
