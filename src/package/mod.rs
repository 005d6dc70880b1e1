use crate::project::asset::AssetHandle;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// In-archive path to contents.
pub type FileSet = BTreeMap<String, AssetHandle>;

// --- Interfaces ---

/// Turns a file set into one archive. Entry names must be kept as given.
#[async_trait]
pub trait Packager: Send + Sync {
    async fn pack(&self, files: FileSet) -> Result<Vec<u8>>;
}

// --- Zip Implementation ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ZipPackager {
    compression: Compression,
}

impl ZipPackager {
    pub fn new(compression: Compression) -> Self {
        Self { compression }
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    fn write_archive(files: &FileSet, method: CompressionMethod) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let opts = SimpleFileOptions::default().compression_method(method);
        for (name, handle) in files {
            zip.start_file(name.as_str(), opts)?;
            zip.write_all(handle.bytes())?;
            debug!(entry = %name, bytes = handle.bytes().len(), "wrote archive entry");
        }
        zip.finish()?;
        Ok(buffer.into_inner())
    }
}

#[async_trait]
impl Packager for ZipPackager {
    async fn pack(&self, files: FileSet) -> Result<Vec<u8>> {
        let method = self.compression.method();
        tokio::task::spawn_blocking(move || Self::write_archive(&files, method))
            .await
            .map_err(|e| anyhow!("Zip task failed: {}", e))?
    }
}
