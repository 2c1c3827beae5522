use base64::Engine;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Base64,
    Utf8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadError {
    NotFound(String),
    IoError(String),
    InvalidUtf8(String),
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::NotFound(path) => write!(f, "File not found: {}", path),
            ReadError::IoError(msg) => write!(f, "IO error: {}", msg),
            ReadError::InvalidUtf8(path) => write!(f, "File is not valid UTF-8: {}", path),
        }
    }
}

impl std::error::Error for ReadError {}

/// Reads a file and returns its content as text
pub trait FileReader: Send + Sync {
    fn read(&self, path: &str, encoding: Encoding) -> Result<String, ReadError>;
}

/// Turns `file:///x`, `file:/x` and plain paths into a filesystem path
pub fn local_path(path: &str) -> PathBuf {
    let stripped = path
        .strip_prefix("file://")
        .or_else(|| path.strip_prefix("file:"))
        .unwrap_or(path);
    PathBuf::from(stripped)
}

/// Reader on top of `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileReader;

impl FileReader for FsFileReader {
    fn read(&self, path: &str, encoding: Encoding) -> Result<String, ReadError> {
        let local = local_path(path);
        let bytes = std::fs::read(&local).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReadError::NotFound(local.display().to_string()),
            _ => ReadError::IoError(format!("{}: {}", local.display(), e)),
        })?;
        log::debug!("Read {} bytes from {:?}", bytes.len(), local);

        match encoding {
            Encoding::Base64 => Ok(base64::engine::general_purpose::STANDARD.encode(bytes)),
            Encoding::Utf8 => {
                String::from_utf8(bytes).map_err(|_| ReadError::InvalidUtf8(path.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(content: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("reader-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("content.bin");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_local_path() {
        assert_eq!(local_path("file:///tmp/a.jpg"), PathBuf::from("/tmp/a.jpg"));
        assert_eq!(local_path("file:/data/a.jpg"), PathBuf::from("/data/a.jpg"));
        assert_eq!(local_path("/data/a.jpg"), PathBuf::from("/data/a.jpg"));
    }

    #[test]
    fn test_read_base64() {
        let path = write_temp(b"hello");
        let text = FsFileReader
            .read(&path.to_string_lossy(), Encoding::Base64)
            .unwrap();
        assert_eq!(text, "aGVsbG8=");
    }

    #[test]
    fn test_read_file_uri_utf8() {
        let path = write_temp(b"hello");
        let uri = format!("file:{}", path.to_string_lossy());
        assert_eq!(FsFileReader.read(&uri, Encoding::Utf8).unwrap(), "hello");
    }

    #[test]
    fn test_read_invalid_utf8() {
        let path = write_temp(&[0xff, 0xfe]);
        assert!(matches!(
            FsFileReader.read(&path.to_string_lossy(), Encoding::Utf8),
            Err(ReadError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            FsFileReader.read("/nonexistent/file.jpg", Encoding::Base64),
            Err(ReadError::NotFound(_))
        ));
    }
}
