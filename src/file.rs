use async_std::path::{Path, PathBuf};
use async_trait::async_trait;

use crate::{config::Config, index::Index, reader, Indexable, ReadByLine, Result};

/// A file path together with the index of its lines. No file handle is kept open, every read
/// opens the file on its own.
#[derive(Debug, Clone)]
pub struct IndexedFile {
    path: PathBuf,
    index: Index,
}

impl IndexedFile {
    /// Open a non indexed file and generates the index.
    pub async fn open_raw<P: AsRef<Path>>(path: P, config: &Config) -> Result<IndexedFile> {
        let path = path.as_ref().to_path_buf();
        let index = Index::build_file(&path, config.growth_chunk).await?;
        Ok(Self { path, index })
    }

    /// Uses a custom index `index` for the file at `path`.
    /// Expects the index to be properly built for that file.
    pub fn open_custom<P: AsRef<Path>>(path: P, index: Index) -> IndexedFile {
        Self {
            path: path.as_ref().to_path_buf(),
            index,
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Indexable for IndexedFile {
    #[inline]
    fn get_index(&self) -> &Index {
        &self.index
    }
}

#[async_trait]
impl ReadByLine for IndexedFile {
    #[inline]
    async fn read_line_raw(&self, line: u64) -> Result<Vec<u8>> {
        reader::fetch(&self.path, &self.index, line).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::LineEntry;

    #[async_std::test]
    async fn test_open_custom() {
        let index = Index::from_entries(vec![
            LineEntry::new(0, 2),
            LineEntry::new(2, 3),
            LineEntry::new(5, 3),
        ])
        .unwrap();

        let file = IndexedFile::open_custom("./testfiles/simple", index);
        assert_eq!(file.total_lines(), 3);
        assert_eq!(file.read_line(2).await.unwrap(), "bb\n");
        assert_eq!(file.read_line(3).await.unwrap(), "ccc");
    }

    #[async_std::test]
    async fn test_growth_chunk_from_config() {
        let config = Config {
            growth_chunk: 1,
            ..Config::default()
        };
        let file = IndexedFile::open_raw("./testfiles/lorem", &config)
            .await
            .unwrap();
        let default = IndexedFile::open_raw("./testfiles/lorem", &Config::default())
            .await
            .unwrap();

        assert_eq!(file.get_index().entries(), default.get_index().entries());
        assert_eq!(file.path(), Path::new("./testfiles/lorem"));
    }
}
