//! # huffstream
//!
//! Lossless two-pass Huffman compression over `std::io` streams.
//!
//! The first pass counts byte frequencies, the tree and code table are
//! built from those counts, and the second pass packs each byte's code
//! behind a self-describing header. Decoding rebuilds the tree from the
//! header and walks the packed bits.
//!
//! ## Quick Start
//!
//! ```rust
//! use huffstream::HuffmanCodec;
//! use std::io::Cursor;
//!
//! let codec = HuffmanCodec::default();
//!
//! let mut container = Vec::new();
//! codec.encode(Cursor::new(b"abracadabra"), &mut container)?;
//!
//! let mut restored = Vec::new();
//! codec.decode(&container[..], &mut restored)?;
//! assert_eq!(restored, b"abracadabra");
//! # Ok::<(), huffstream::Error>(())
//! ```

pub mod bit_reader;
pub mod bit_writer;
pub mod code_table;
pub mod config;
pub mod error;
pub mod frequency;
pub mod huffman_codec;
pub mod hufftree;
pub mod metadata;
pub mod summary;

// Internal modules - not part of public API
mod min_heap;

pub use bit_reader::BitReader;
pub use bit_writer::BitWriter;
pub use code_table::{Code, CodeTable};
pub use config::CodecConfig;
pub use error::{Error, Result};
pub use frequency::FrequencyTable;
pub use huffman_codec::HuffmanCodec;
pub use hufftree::{HuffNode, HuffmanTree};
pub use summary::{DecodeSummary, EncodeSummary};
