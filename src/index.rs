use std::{future, pin::Pin};

use async_std::{
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};
use itertools::Itertools;
use tracing::{debug, info};

use crate::{config::DEFAULT_GROWTH_CHUNK, error::Error, Result};

/// Location of a single line within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineEntry {
    /// Position of the lines first byte
    offset: u64,
    /// Amount of bytes of the line, including the trailing \n if there is one
    length: u64,
}

impl LineEntry {
    #[inline]
    pub fn new(offset: u64, length: u64) -> LineEntry {
        Self { offset, length }
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[inline]
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Offset of the first byte after this line
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Contains an in-memory line-index
#[derive(Debug, Clone)]
pub struct Index {
    /// The position within the Vec is the line number minus one
    inner: Vec<LineEntry>,
    /// Amount of entries to reserve each time `inner` is full
    growth_chunk: usize,
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

impl Index {
    /// Create a new, empty Index
    pub fn new() -> Index {
        Self::with_growth_chunk(DEFAULT_GROWTH_CHUNK)
    }

    /// Create a new, empty Index which grows by `growth_chunk` entries at once
    pub fn with_growth_chunk(growth_chunk: usize) -> Index {
        Self {
            inner: Vec::new(),
            growth_chunk: growth_chunk.max(1),
        }
    }

    /// Wraps an already built table. Returns an error if the entries don't describe a
    /// contiguous sequence of lines starting at offset 0.
    pub fn from_entries(entries: Vec<LineEntry>) -> Result<Index> {
        if let Some(first) = entries.first() {
            if first.offset != 0 {
                return Err(Error::MalformedIndex {
                    entry: 0,
                    reason: "first line does not start at offset 0",
                });
            }
        }

        if let Some(pos) = entries.iter().position(|e| e.length == 0) {
            return Err(Error::MalformedIndex {
                entry: pos,
                reason: "line entry has zero length",
            });
        }

        if let Some(pos) = entries
            .iter()
            .tuple_windows()
            .position(|(a, b)| a.end() != b.offset)
        {
            return Err(Error::MalformedIndex {
                entry: pos + 1,
                reason: "line does not start where the previous one ends",
            });
        }

        Ok(Self {
            inner: entries,
            growth_chunk: DEFAULT_GROWTH_CHUNK,
        })
    }

    /// Build a new index for the file at `path`. The file is only held open while scanning.
    pub async fn build_file<P: AsRef<Path>>(path: P, growth_chunk: usize) -> Result<Index> {
        let path = path.as_ref();

        let file = fs::File::open(path).await.map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        let index = Self::build(&mut reader, growth_chunk)
            .await
            .map_err(|e| e.at_path(path))?;

        info!(
            path = %path.display(),
            lines = index.len(),
            bytes = index.total_bytes(),
            "built line index"
        );

        Ok(index)
    }

    /// Build a new index for the text within `reader`, starting at the readers current position
    /// which is treated as offset 0. Only line lengths are counted, no line is copied out of the
    /// readers buffer.
    pub async fn build<R: BufRead + Unpin>(reader: &mut R, growth_chunk: usize) -> Result<Index> {
        let mut index = Self::with_growth_chunk(growth_chunk);
        let mut curr_offset: u64 = 0;
        let mut line_len: u64 = 0;

        loop {
            let (available, newline) = future::poll_fn(|cx| {
                Pin::new(&mut *reader)
                    .poll_fill_buf(cx)
                    .map_ok(|buf| (buf.len(), buf.iter().position(|b| *b == b'\n')))
            })
            .await
            .map_err(|source| Error::Read {
                path: PathBuf::new(),
                source,
            })?;

            if available == 0 {
                break;
            }

            let used = newline.map(|pos| pos + 1).unwrap_or(available);
            Pin::new(&mut *reader).consume(used);
            line_len += used as u64;

            if newline.is_some() {
                index.append(LineEntry::new(curr_offset, line_len))?;
                curr_offset += line_len;
                line_len = 0;
            }
        }

        // Last line without trailing \n
        if line_len > 0 {
            index.append(LineEntry::new(curr_offset, line_len))?;
        }

        Ok(index)
    }

    /// Appends a line to the end of the index. The line has to start exactly where the last one
    /// ends.
    pub(crate) fn append(&mut self, entry: LineEntry) -> Result<()> {
        if entry.length == 0 {
            return Err(Error::MalformedIndex {
                entry: self.inner.len(),
                reason: "line entry has zero length",
            });
        }

        if entry.offset != self.total_bytes() {
            return Err(Error::MalformedIndex {
                entry: self.inner.len(),
                reason: "line does not start where the previous one ends",
            });
        }

        if self.inner.len() == self.inner.capacity() {
            self.grow()?;
        }

        self.inner.push(entry);
        Ok(())
    }

    fn grow(&mut self) -> Result<()> {
        self.inner
            .try_reserve_exact(self.growth_chunk)
            .map_err(|source| Error::Memory {
                what: "line entries",
                additional: self.growth_chunk,
                source,
            })?;

        debug!(capacity = self.inner.capacity(), "grew line index");
        Ok(())
    }

    /// Get the entry of the 1-based line number `line`
    #[inline]
    pub fn get(&self, line: u64) -> Result<LineEntry> {
        line.checked_sub(1)
            .and_then(|pos| usize::try_from(pos).ok())
            .and_then(|pos| self.inner.get(pos))
            .copied()
            .ok_or(Error::LineNotFound {
                line,
                total: self.len(),
            })
    }

    /// Returns the amount of lines indexed
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the index holds no line
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Amount of bytes covered by the index. Equals the size of the indexed file.
    #[inline]
    pub fn total_bytes(&self) -> u64 {
        self.inner.last().map(LineEntry::end).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineEntry> {
        self.inner.iter()
    }

    pub fn entries(&self) -> &[LineEntry] {
        &self.inner
    }
}
