use async_std::{
    io::{prelude::*, BufRead, Write},
    path::Path,
};
use tracing::{debug, info};

use crate::{config::Config, error::Error, file::IndexedFile, ReadByLine, Result};

/// Text written before each line number is read
pub const PROMPT: &str = "Enter your number: ";
/// Line number which ends the session
pub const EXIT_CMD: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    AwaitingNumber,
    Terminated,
}

/// Reads line numbers from an input and prints the matching lines until `0` is entered.
#[derive(Debug)]
pub struct Session<L: ReadByLine> {
    lines: L,
    config: Config,
}

impl Session<IndexedFile> {
    /// Indexes the file at `path` and creates a session serving its lines.
    pub async fn open<P: AsRef<Path>>(path: P, config: Config) -> Result<Session<IndexedFile>> {
        let file = IndexedFile::open_raw(path, &config).await?;
        Ok(Self::new(file, config))
    }
}

impl<L: ReadByLine + Sync> Session<L> {
    pub fn new(lines: L, config: Config) -> Session<L> {
        Self { lines, config }
    }

    pub fn lines(&self) -> &L {
        &self.lines
    }

    /// Runs the session until `0` or the end of `input` is reached. The first error ends the
    /// session and is returned.
    pub async fn run<R, W>(&self, input: &mut R, output: &mut W) -> Result<()>
    where
        R: BufRead + Unpin,
        W: Write + Unpin,
    {
        let mut state = State::AwaitingNumber;
        while state == State::AwaitingNumber {
            state = self.step(input, output).await?;
        }

        info!("session terminated");
        Ok(())
    }

    /// Reads a single line number and prints its line
    pub async fn step<R, W>(&self, input: &mut R, output: &mut W) -> Result<State>
    where
        R: BufRead + Unpin,
        W: Write + Unpin,
    {
        let line = match read_number(input, output, self.config.max_digits).await? {
            None | Some(EXIT_CMD) => return Ok(State::Terminated),
            Some(line) => line,
        };

        debug!(line, "line requested");
        let bytes = self.lines.read_line_raw(line).await?;

        output.write_all(&bytes).await.map_err(Error::Print)?;
        output.flush().await.map_err(Error::Print)?;

        Ok(State::AwaitingNumber)
    }
}

/// Prompts for and reads a single line number from `input`. Returns `None` once `input` has no
/// more data.
///
/// At most `max_digits` plus a line ending are read; longer input is rejected instead of being
/// cut off.
pub async fn read_number<R, W>(
    input: &mut R,
    output: &mut W,
    max_digits: usize,
) -> Result<Option<u64>>
where
    R: BufRead + Unpin,
    W: Write + Unpin,
{
    output
        .write_all(PROMPT.as_bytes())
        .await
        .map_err(Error::Write)?;
    output.flush().await.map_err(Error::Write)?;

    // Room for the digits, a \r\n and nothing more
    let cap = max_digits + 2;
    let mut buf = Vec::with_capacity(cap);

    let mut limited = (&mut *input).take(cap as u64);
    let n = limited
        .read_until(b'\n', &mut buf)
        .await
        .map_err(Error::ReadInput)?;

    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    if buf.len() > max_digits {
        return Err(Error::InputTooLong {
            len: buf.len(),
            max: max_digits,
        });
    }

    if buf.is_empty() {
        return Err(Error::EmptyInput);
    }

    let not_digit = || Error::NotDigit {
        input: String::from_utf8_lossy(&buf).into_owned(),
    };

    if !buf.iter().all(u8::is_ascii_digit) {
        return Err(not_digit());
    }

    let number = std::str::from_utf8(&buf)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(not_digit)?;

    Ok(Some(number))
}
