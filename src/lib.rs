//!A small library to index the lines of a file once and read any of them by number afterwards
//!using a single positioned read

/// In-memory data with a line index
pub mod buffer;
pub mod config;
pub mod error;
/// A file path together with the index of the files lines
pub mod file;
/// The index of files
pub mod index;
/// Positioned reads of single lines
pub mod reader;
/// The interactive read-a-number, print-a-line loop
pub mod session;

pub use buffer::IndexedBuffer;
pub use config::Config;
pub use error::{Error, ErrorKind};
pub use file::IndexedFile;
pub use index::{Index, LineEntry};

use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, error::Error>;

pub trait Indexable {
    /// Returns a reference to the index.
    fn get_index(&self) -> &Index;

    /// Returns the total amount of lines.
    #[inline]
    fn total_lines(&self) -> usize {
        self.get_index().len()
    }
}

/// A trait defining behavior for reading certain lines directly from indexed data.
#[async_trait]
pub trait ReadByLine: Indexable {
    /// Reads the raw bytes of line `line`, counting from 1. Includes the trailing \n if the line
    /// has one.
    async fn read_line_raw(&self, line: u64) -> Result<Vec<u8>>;

    /// Reads the given line as UTF-8 string
    async fn read_line(&self, line: u64) -> Result<String> {
        let raw = self.read_line_raw(line).await?;
        Ok(String::from_utf8(raw)?)
    }
}
