use crate::readers::ShardCursor;
use crate::sample::Sample;
use crate::source::{SampleSource, Shard};
use anyhow::{anyhow, bail, ensure, Context, Result};
use std::fs::{self, File};
use std::io::Read;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Serves one file per sample, reading the raw bytes (no decoding).
///
/// The file list is fixed at construction and sorted, so every shard sees a
/// deterministic order and shards of the same directory never overlap.
///
/// # Example
/// ```ignore
/// let source = FileSource::from_dir(
///     "./data/images",
///     &["jpg", "png"], // Allowed extensions (case-insensitive)
///     true,            // Enable recursion
///     Shard::new(rank, world_size),
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct FileSource {
    paths: Vec<PathBuf>,
    cursor: ShardCursor,
}

impl FileSource {
    /// Creates a source over an explicit list of files.
    pub fn new(paths: Vec<PathBuf>, shard: Shard) -> Result<Self> {
        ensure!(!paths.is_empty(), "File list must not be empty");
        let cursor = ShardCursor::new(shard, paths.len())?;
        Ok(Self { paths, cursor })
    }

    /// Scans a directory for files.
    ///
    /// # Arguments
    /// - `dir_path`: Directory to scan.
    /// - `extensions`: File extensions to include (e.g., `["jpg", "png"]`). Case-insensitive.
    ///                 An empty list accepts every file.
    /// - `recurse`: If `true`, scans subdirectories recursively.
    /// - `shard`: The shard of the sorted file list this source serves.
    pub fn from_dir(
        dir_path: impl Into<PathBuf>,
        extensions: &[&str],
        recurse: bool,
        shard: Shard,
    ) -> Result<Self> {
        let dir_path = dir_path.into();
        let dir_metadata = fs::metadata(&dir_path)
            .with_context(|| format!("Failed to access directory: {}", dir_path.display()))?;
        if !dir_metadata.is_dir() {
            bail!("Path is not a directory: {}", dir_path.display());
        }

        let extensions: Vec<String> = extensions.iter().map(|s| s.to_lowercase()).collect();
        let max_depth = if recurse { usize::MAX } else { 1 };

        let mut paths = Vec::new();
        for entry in WalkDir::new(&dir_path).max_depth(max_depth) {
            let entry = entry.map_err(|e| anyhow!("Failed to read directory entry: {}", e))?;
            // Skip symlinks and directories
            if !entry.file_type().is_file() {
                continue;
            }
            let extension_matches = extensions.is_empty()
                || entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| extensions.contains(&e.to_lowercase()));
            if extension_matches {
                paths.push(entry.into_path());
            }
        }
        paths.sort();

        ensure!(
            !paths.is_empty(),
            "No matching files found in {}",
            dir_path.display()
        );
        Self::new(paths, shard)
    }

    /// Path of the file with global index `index`.
    pub fn path(&self, index: usize) -> Option<&PathBuf> {
        self.paths.get(index)
    }

    pub fn epoch(&self) -> usize {
        self.cursor.epoch()
    }
}

impl SampleSource for FileSource {
    fn read_sample(&mut self, sample: &mut Sample) -> Result<()> {
        let index = self.cursor.advance();
        let path = &self.paths[index];

        let mut file = File::open(path)
            .with_context(|| format!("Failed to open sample file: {}", path.display()))?;
        let storage = sample.storage_mut();
        storage.clear();
        file.read_to_end(storage)
            .with_context(|| format!("Failed to read sample file: {}", path.display()))?;

        sample.set_source_index(index);
        Ok(())
    }

    fn size(&self) -> usize {
        self.cursor.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Backend;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_dir_scan_filters_and_sorts() -> Result<()> {
        let dir = tempdir()?;
        let d = dir.path();

        File::create(d.join("b.JPG"))?.write_all(b"bbb")?;
        File::create(d.join("a.png"))?.write_all(b"a")?;
        File::create(d.join("ignore.txt"))?.write_all(b"nope")?;
        fs::create_dir(d.join("nested"))?;
        File::create(d.join("nested").join("c.jpg"))?.write_all(b"cc")?;

        let flat = FileSource::from_dir(d, &["jpg", "png"], false, Shard::default())?;
        assert_eq!(flat.size(), 2);

        let mut source = FileSource::from_dir(d, &["jpg", "png"], true, Shard::default())?;
        assert_eq!(source.size(), 3);

        let mut sample = Sample::with_capacity(Backend::Host, 8);
        let mut contents = Vec::new();
        for _ in 0..3 {
            source.read_sample(&mut sample)?;
            contents.push(sample.as_bytes().to_vec());
        }
        // Sorted by path: a.png, b.JPG, nested/c.jpg
        assert_eq!(contents, vec![b"a".to_vec(), b"bbb".to_vec(), b"cc".to_vec()]);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("gone.bin");
        File::create(&path)?;
        let mut source = FileSource::new(vec![path.clone()], Shard::default())?;
        fs::remove_file(&path)?;

        let mut sample = Sample::with_capacity(Backend::Host, 8);
        let err = source.read_sample(&mut sample).unwrap_err();
        assert!(err.to_string().contains("gone.bin"));
        Ok(())
    }

    #[test]
    fn test_rejects_non_directory_and_empty() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("plain.jpg");
        File::create(&file)?;

        assert!(FileSource::from_dir(&file, &[], false, Shard::default()).is_err());
        assert!(FileSource::from_dir(dir.path(), &["png"], false, Shard::default()).is_err());
        assert!(FileSource::new(Vec::new(), Shard::default()).is_err());
        Ok(())
    }
}
