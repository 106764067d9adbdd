use async_std::{
    fs,
    io::{prelude::*, SeekFrom},
    path::Path,
};
use tracing::{debug, warn};

use crate::{error::Error, index::Index, Result};

/// Reads line `line` (1-based) of the file at `path`, using `index` to locate it.
///
/// The file is opened for this single read and closed before returning. The returned bytes are
/// exactly the bytes stored in the file, including the trailing \n if the line has one. Line
/// numbers outside of the index fail with `LineNotFound` without touching the file.
pub async fn fetch<P: AsRef<Path>>(path: P, index: &Index, line: u64) -> Result<Vec<u8>> {
    let entry = index.get(line)?;
    let path = path.as_ref();

    // Can only be lossy on 32 bit targets, where reserving that much fails anyways
    let len = usize::try_from(entry.length()).unwrap_or(usize::MAX);
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|source| Error::Memory {
        what: "line bytes",
        additional: len,
        source,
    })?;

    let mut file = fs::File::open(path).await.map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    file.seek(SeekFrom::Start(entry.offset()))
        .await
        .map_err(|source| Error::Seek {
            path: path.to_path_buf(),
            offset: entry.offset(),
            source,
        })?;

    // `take` caps the read, so nothing past the line ever ends up in `buf`
    let read = file
        .take(entry.length())
        .read_to_end(&mut buf)
        .await
        .map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

    if (read as u64) < entry.length() {
        warn!(
            path = %path.display(),
            line,
            expected = entry.length(),
            read,
            "short read, file changed after it was indexed"
        );
    } else {
        debug!(line, offset = entry.offset(), len = read, "fetched line");
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::error::ErrorKind;

    fn path(file: &NamedTempFile) -> &Path {
        Path::new(file.path())
    }

    fn temp_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[async_std::test]
    async fn test_fetch_scenario() {
        let file = temp_file(b"a\nbb\nccc");
        let index = Index::build_file(path(&file), 1024).await.unwrap();

        assert_eq!(fetch(path(&file), &index, 1).await.unwrap(), b"a\n");
        assert_eq!(fetch(path(&file), &index, 2).await.unwrap(), b"bb\n");
        assert_eq!(fetch(path(&file), &index, 3).await.unwrap(), b"ccc");
    }

    #[async_std::test]
    async fn test_out_of_range_does_not_touch_file() {
        let index = Index::from_entries(vec![crate::index::LineEntry::new(0, 4)]).unwrap();
        let missing = "./testfiles/does-not-exist";

        for line in [0, 2] {
            let err = fetch(missing, &index, line).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::LineNotFound);
        }

        // A valid line number does reach the filesystem
        let err = fetch(missing, &index, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Open);
    }

    #[async_std::test]
    async fn test_repeated_fetch_is_identical() {
        let file = temp_file(b"first\nsecond\nthird\n");
        let index = Index::build_file(path(&file), 2).await.unwrap();

        let first = fetch(path(&file), &index, 2).await.unwrap();
        for _ in 0..5 {
            assert_eq!(fetch(path(&file), &index, 3).await.unwrap(), b"third\n");
            assert_eq!(fetch(path(&file), &index, 2).await.unwrap(), first);
        }
    }

    #[async_std::test]
    async fn test_short_read_is_truncated() {
        let file = temp_file(b"one\ntwo\nthree\n");
        let index = Index::build_file(path(&file), 1024).await.unwrap();

        file.as_file().set_len(10).unwrap();

        assert_eq!(fetch(path(&file), &index, 3).await.unwrap(), b"th");
    }

    #[async_std::test]
    async fn test_never_reads_past_line() {
        let file = temp_file(b"one\ntwo\nthree\n");
        let index = Index::build_file(path(&file), 1024).await.unwrap();

        // Grow the file, the next line is not part of line 1
        let mut handle = std::fs::OpenOptions::new()
            .append(true)
            .open(file.path())
            .unwrap();
        handle.write_all(b"four\n").unwrap();

        assert_eq!(fetch(path(&file), &index, 1).await.unwrap(), b"one\n");
        assert_eq!(fetch(path(&file), &index, 3).await.unwrap(), b"three\n");
    }
}
