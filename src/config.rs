use serde::{Deserialize, Serialize};

/// Chunk size used for input scans and buffered I/O.
pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

/// Tunables for [`HuffmanCodec`](crate::HuffmanCodec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Capacity of the read/write buffers wrapped around the caller's streams.
    pub buffer_size: usize,
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Buffer capacity actually handed to `BufReader`/`BufWriter`.
    pub(crate) fn effective_buffer_size(&self) -> usize {
        self.buffer_size.max(1)
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}
