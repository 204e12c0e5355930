//! ZIP-backed container

use std::fs::File;
use std::path::Path;

use ::zip::write::FileOptions;
use ::zip::{CompressionMethod, ZipWriter};

use super::errors::{ContainerError, ContainerResult};
use super::ContainerWriter;

/// Writes package entries straight into a deflate-compressed ZIP archive.
pub struct ZipContainer {
    writer: Option<ZipWriter<File>>,
    options: FileOptions,
}

impl ZipContainer {
    /// Creates the archive file at `path`, truncating any existing file.
    pub fn create(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| ContainerError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self {
            writer: Some(ZipWriter::new(file)),
            options: FileOptions::default().compression_method(CompressionMethod::Deflated),
        })
    }
}

impl ContainerWriter for ZipContainer {
    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> ContainerResult<()> {
        use std::io::Write;

        let writer = self.writer.as_mut().ok_or(ContainerError::Finished)?;
        writer
            .start_file(path, self.options)
            .map_err(|e| ContainerError::Archive(e.to_string()))?;
        writer.write_all(bytes).map_err(|e| ContainerError::Io {
            path: path.to_string(),
            source: e,
        })
    }

    fn finish(&mut self) -> ContainerResult<()> {
        let mut writer = self.writer.take().ok_or(ContainerError::Finished)?;
        writer
            .finish()
            .map_err(|e| ContainerError::Archive(e.to_string()))?;
        Ok(())
    }
}
