use async_std::io::Cursor;
use async_trait::async_trait;

use crate::{error::Error, index::Index, Indexable, ReadByLine, Result};

/// Bytes held in memory together with the index of their lines.
#[derive(Debug, Clone)]
pub struct IndexedBuffer<'a> {
    data: &'a [u8],
    index: Index,
}

impl<'a> IndexedBuffer<'a> {
    /// Create a new `IndexedBuffer` from unindexed data and builds an index.
    pub async fn new_raw(data: &'a [u8], growth_chunk: usize) -> Result<IndexedBuffer<'a>> {
        let index = Index::build(&mut Cursor::new(data), growth_chunk).await?;
        Ok(Self { data, index })
    }

    /// Create a new `IndexedBuffer` using `index`. Fails if the index doesn't cover `data`
    /// exactly.
    pub fn new_custom(data: &'a [u8], index: Index) -> Result<IndexedBuffer<'a>> {
        if index.total_bytes() != data.len() as u64 {
            return Err(Error::MalformedIndex {
                entry: index.len(),
                reason: "index does not cover the data",
            });
        }

        Ok(Self { data, index })
    }
}

impl<'a> Indexable for IndexedBuffer<'a> {
    #[inline]
    fn get_index(&self) -> &Index {
        &self.index
    }
}

#[async_trait]
impl<'a> ReadByLine for IndexedBuffer<'a> {
    async fn read_line_raw(&self, line: u64) -> Result<Vec<u8>> {
        let entry = self.index.get(line)?;

        // new_custom guarantees the index lies within `data`
        let start = usize::try_from(entry.offset()).unwrap_or(usize::MAX);
        let end = usize::try_from(entry.end()).unwrap_or(usize::MAX);
        let bytes = self.data.get(start..end).ok_or(Error::MalformedIndex {
            entry: (line - 1) as usize,
            reason: "line lies outside of the data",
        })?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, index::LineEntry};

    #[async_std::test]
    async fn test_scenario() {
        let buffer = IndexedBuffer::new_raw(b"a\nbb\nccc", 1024).await.unwrap();
        assert_eq!(buffer.read_line_raw(1).await.unwrap(), b"a\n");
        assert_eq!(buffer.read_line_raw(2).await.unwrap(), b"bb\n");
        assert_eq!(buffer.read_line_raw(3).await.unwrap(), b"ccc");
    }

    #[test]
    fn test_custom_must_cover_data() {
        let index = Index::from_entries(vec![LineEntry::new(0, 3)]).unwrap();
        let err = IndexedBuffer::new_custom(b"abcdef", index.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedIndex);

        assert!(IndexedBuffer::new_custom(b"ab\n", index).is_ok());
    }
}
