//! Where import text comes from

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

/// A readable, named source of import text.
///
/// Each call to [`FileSource::read_text`] opens the source afresh and
/// closes it before returning; no handle is held between reads.
pub trait FileSource {
    /// Human-readable location, used in messages
    fn location(&self) -> String;

    fn exists(&self) -> bool;

    fn read_text(&self) -> io::Result<String>;
}

/// A file on disk, opened read-only
#[derive(Debug, Clone)]
pub struct PathSource {
    path: PathBuf,
}

impl PathSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FileSource for PathSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Invalid UTF-8 sequences decode to U+FFFD instead of failing the read
    fn read_text(&self) -> io::Result<String> {
        let mut file = File::open(&self.path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = PathSource::new(dir.path().join("absent.csv"));
        assert!(!source.exists());
        assert!(source.read_text().is_err());
    }

    #[test]
    fn test_reads_whole_file_each_time() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "header\nrow").unwrap();

        let source = PathSource::new(file.path());
        assert!(source.exists());
        assert_eq!(source.read_text().unwrap(), "header\nrow");
        assert_eq!(source.read_text().unwrap(), "header\nrow");
        assert_eq!(source.location(), file.path().display().to_string());
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"header\nCaf\xe9,desc,bot,llm,chat").unwrap();

        let text = PathSource::new(file.path()).read_text().unwrap();
        assert_eq!(text, "header\nCaf\u{FFFD},desc,bot,llm,chat");
    }

    #[test]
    fn test_directory_is_not_a_source() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!PathSource::new(dir.path()).exists());
    }
}
