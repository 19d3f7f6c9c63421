//! Output directory layout.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};

/// The directory one extraction writes into.
///
/// Per-page files are `page-N.<ext>` for images and `text-N.<ext>` for
/// text; document files are written by name.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Wrap an existing directory path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of a page image, e.g. `page-3.png`.
    pub fn page_file(&self, page: u32, ext: &str) -> PathBuf {
        self.root.join(format!("page-{}.{}", page, ext))
    }

    /// Path of a page text file, e.g. `text-3.html`.
    pub fn text_file(&self, page: u32, ext: &str) -> PathBuf {
        self.root.join(format!("text-{}.{}", page, ext))
    }

    /// Path of a document-level file.
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write bytes to a path inside the directory.
    pub fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
        fs::write(path, contents)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    /// Check that the directory exists and accepts new files.
    pub fn ensure_writable(&self) -> Result<()> {
        let not_writable = |reason: String| Error::OutputNotWritable {
            path: self.root.clone(),
            reason,
        };

        let meta = fs::metadata(&self.root).map_err(|e| not_writable(e.to_string()))?;
        if !meta.is_dir() {
            return Err(not_writable("not a directory".to_string()));
        }

        let probe = self
            .root
            .join(format!(".pdfextractor-probe-{}", std::process::id()));
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&probe)
            .map_err(|e| not_writable(e.to_string()))?;
        fs::remove_file(&probe).map_err(|e| not_writable(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_names() {
        let out = OutputDir::new("/tmp/out");
        assert_eq!(out.page_file(2, "png"), PathBuf::from("/tmp/out/page-2.png"));
        assert_eq!(out.text_file(10, "txt"), PathBuf::from("/tmp/out/text-10.txt"));
        assert_eq!(out.file("info.json"), PathBuf::from("/tmp/out/info.json"));
    }

    #[test]
    fn test_ensure_writable() {
        let dir = TempDir::new().unwrap();
        let out = OutputDir::new(dir.path());
        out.ensure_writable().unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        let missing = OutputDir::new(dir.path().join("missing"));
        assert!(matches!(
            missing.ensure_writable(),
            Err(Error::OutputNotWritable { .. })
        ));

        let file = dir.path().join("plain");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            OutputDir::new(&file).ensure_writable(),
            Err(Error::OutputNotWritable { .. })
        ));
    }
}
