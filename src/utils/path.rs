//! Path utilities for job directories and chunk ingestion

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::model::Chunk;

/// Path utilities for the job layout
pub struct PathUtils;

impl PathUtils {
    /// Lower-cased extension of a path, if any
    pub fn get_extension(path: &Path) -> Option<String> {
        path.extension().map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Create a directory and all of its parents
    pub async fn ensure_dir(path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    /// Whether `dir` exists and holds at least one entry
    pub async fn has_entries(dir: &Path) -> std::io::Result<bool> {
        match tokio::fs::read_dir(dir).await {
            Ok(mut entries) => Ok(entries.next_entry().await?.is_some()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// List the chunk files directly inside `dir`, sorted by index.
    ///
    /// Only names of the form `chunk_NNN.mp4` count; anything else the
    /// segmenter or a later stage left behind is ignored.
    pub fn list_chunks(dir: &Path, nominal_seconds: u32) -> std::io::Result<Vec<Chunk>> {
        let mut chunks = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if let Some(index) = Chunk::parse_index(&name) {
                chunks.push(Chunk::new(index, entry.path(), nominal_seconds));
            }
        }

        chunks.sort_by_key(|c| c.index);
        Ok(chunks)
    }

    /// Make a path absolute against the current directory without touching the filesystem
    pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(std::env::current_dir()?.join(path))
        }
    }
}
