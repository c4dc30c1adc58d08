use crate::readers::ShardCursor;
use crate::sample::Sample;
use crate::source::{SampleSource, Shard};
use anyhow::{ensure, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Serves each non-blank line of a text file as one sample (UTF-8 bytes,
/// without the line terminator).
///
/// Lines are loaded once at construction; blank lines are skipped.
///
/// # Example
/// ```ignore
/// let source = LineSource::open("captions.txt", Shard::new(rank, world_size))?;
/// ```
#[derive(Debug, Clone)]
pub struct LineSource {
    lines: Vec<String>,
    cursor: ShardCursor,
}

impl LineSource {
    pub fn open(path: impl AsRef<Path>, shard: Shard) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open text file: {}", path.display()))?;

        let mut lines = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let text = line.with_context(|| format!("Error reading line {}", line_num + 1))?;
            if !text.trim().is_empty() {
                lines.push(text);
            }
        }
        ensure!(!lines.is_empty(), "No lines found in {}", path.display());

        let cursor = ShardCursor::new(shard, lines.len())?;
        Ok(Self { lines, cursor })
    }

    pub fn epoch(&self) -> usize {
        self.cursor.epoch()
    }
}

impl SampleSource for LineSource {
    fn read_sample(&mut self, sample: &mut Sample) -> Result<()> {
        let index = self.cursor.advance();
        sample.fill_from(self.lines[index].as_bytes());
        sample.set_source_index(index);
        Ok(())
    }

    fn size(&self) -> usize {
        self.cursor.len()
    }
}
