//! Destinations for generated artifacts.
//!
//! The playlist writer only ever hands named byte blobs to an
//! [`ArtifactSink`]; where they land is the sink's business.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Receives named artifacts from the playlist writer.
pub trait ArtifactSink {
    fn write(&mut self, name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Writes artifacts as files in a single output directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create the sink, creating `root` (and parents) if missing.
    pub fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of an artifact written by this sink.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl ArtifactSink for DirectorySink {
    fn write(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.path(name);
        debug!("Writing {} ({} bytes)", path.display(), bytes.len());
        fs::write(path, bytes)
    }
}

/// Keeps artifacts in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Artifact contents as UTF-8, `None` if missing or not text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
        self.files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_sink_creates_root_and_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("nested").join("out");

        let mut sink = DirectorySink::create(&root).unwrap();
        sink.write("a.m3u8", b"#EXTM3U\n").unwrap();

        assert_eq!(fs::read(root.join("a.m3u8")).unwrap(), b"#EXTM3U\n");
        assert_eq!(sink.path("a.m3u8"), root.join("a.m3u8"));
    }

    #[test]
    fn memory_sink_overwrites_by_name() {
        let mut sink = MemorySink::new();
        sink.write("x", b"one").unwrap();
        sink.write("x", b"two").unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.text("x"), Some("two"));
        assert_eq!(sink.text("missing"), None);
    }
}
