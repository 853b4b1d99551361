use crate::metadata;

/// What one encode call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeSummary {
    pub input_bytes: u64,
    pub distinct_symbols: usize,
    pub tree_bit_length: u16,
    pub content_bit_length: u64,
}

impl EncodeSummary {
    /// Size of the container written, in bytes.
    pub fn container_len(&self) -> u64 {
        metadata::container_len(self.tree_bit_length, self.content_bit_length)
    }

    /// Container size over input size; `None` for empty input.
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.input_bytes == 0 {
            return None;
        }
        Some(self.container_len() as f64 / self.input_bytes as f64)
    }
}

/// What one decode call consumed and produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeSummary {
    pub tree_bit_length: u16,
    pub content_bit_length: u64,
    pub output_bytes: u64,
}
