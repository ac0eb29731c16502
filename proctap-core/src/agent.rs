//! Agent source loader
//!
//! Reads the injected agent's source text from disk, once, at startup. No
//! caching and no hot-reload; the text is immutable after load.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// The agent payload to inject, together with where it came from.
#[derive(Debug, Clone)]
pub struct AgentSource {
    path: PathBuf,
    source: String,
}

impl AgentSource {
    /// Read the file at `path` as UTF-8 text.
    ///
    /// Fails if the file is missing or not valid UTF-8; the two cases carry
    /// distinct context. Whether the text is a valid agent for the target
    /// runtime is not checked here — that surfaces later as a script load
    /// error or as error messages on the relay.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read agent source at {}", path.display()))?;
        let source = String::from_utf8(bytes)
            .with_context(|| format!("agent source at {} is not valid UTF-8", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_reads_full_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_agent.js");
        fs::write(&path, "hello();").unwrap();

        let agent = AgentSource::load(&path).unwrap();
        assert_eq!(agent.source(), "hello();");
        assert_eq!(agent.len(), 8);
        assert_eq!(agent.path(), path.as_path());
    }

    #[test]
    fn test_missing_file_fails_with_path_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.js");

        let err = AgentSource::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to read agent source"));
        assert!(err.to_string().contains("nope.js"));
    }

    #[test]
    fn test_invalid_utf8_fails_with_encoding_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.js");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(&[0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = AgentSource::load(&path).unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }
}
