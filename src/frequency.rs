use std::io::{self, Read};

use crate::error::Result;

/// Occurrence count of every byte value in one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable { counts: [0; 256] }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut table = Self::new();
        table.record(bytes);
        table
    }

    /// Count every byte `reader` yields until it is exhausted, `chunk_size`
    /// bytes at a time.
    pub fn from_reader<R: Read>(reader: R, chunk_size: usize) -> Result<Self> {
        let mut table = Self::new();
        scan(reader, chunk_size, |chunk| {
            table.record(chunk);
            Ok(())
        })?;
        Ok(table)
    }

    pub fn record(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.counts[byte as usize] += 1;
        }
    }

    pub fn get(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    /// Present symbols and their counts, ascending by byte value.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(byte, &count)| (byte as u8, count))
    }

    /// Number of distinct byte values seen.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }
}

/// Feed `reader` to `visit` in chunks of at most `chunk_size` bytes until
/// it is exhausted. Returns the number of bytes seen.
pub(crate) fn scan<R, F>(mut reader: R, chunk_size: usize, mut visit: F) -> Result<u64>
where
    R: Read,
    F: FnMut(&[u8]) -> Result<()>,
{
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => return Ok(total),
            Ok(n) => {
                visit(&buffer[..n])?;
                total += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Collect explicit `(byte, count)` pairs; repeated bytes accumulate.
impl FromIterator<(u8, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (u8, u64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (byte, count) in iter {
            table.counts[byte as usize] += count;
        }
        table
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}
