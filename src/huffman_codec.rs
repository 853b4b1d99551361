use std::io::{BufWriter, Cursor, Read, Seek, Write};

use bitvec::field::BitField;
use log::{debug, trace, warn};

use crate::bit_reader::BitReader;
use crate::bit_writer::BitWriter;
use crate::code_table::{Code, CodeTable};
use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::frequency::{self, FrequencyTable};
use crate::hufftree::HuffmanTree;
use crate::metadata;
use crate::summary::{DecodeSummary, EncodeSummary};

/// Two-pass Huffman encoder and matching decoder.
///
/// Holds no per-call state: every frequency table, tree and code table
/// lives only for the duration of one `encode` or `decode`.
#[derive(Debug, Clone, Default)]
pub struct HuffmanCodec {
    config: CodecConfig,
}

impl HuffmanCodec {
    pub fn new(config: CodecConfig) -> Self {
        HuffmanCodec { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compress everything in `input` into a container written to `output`.
    ///
    /// `input` is read twice, once for the symbol statistics and once to
    /// emit the codes, and is rewound to its start before each pass. On
    /// error `output` may hold a partial container.
    pub fn encode<R, W>(&self, mut input: R, output: W) -> Result<EncodeSummary>
    where
        R: Read + Seek,
        W: Write,
    {
        let buffer_size = self.config.effective_buffer_size();

        input.rewind()?;
        let frequencies = FrequencyTable::from_reader(&mut input, buffer_size)?;
        debug!(
            "frequency pass: {} bytes, {} distinct symbols",
            frequencies.total(),
            frequencies.distinct()
        );

        let mut writer = BitWriter::with_capacity(buffer_size, output);
        let Some(tree) = HuffmanTree::build(&frequencies) else {
            metadata::write_tree_header(&mut writer, None)?;
            metadata::write_content_length(&mut writer, 0)?;
            writer.flush()?;
            debug!("empty input, wrote empty container");
            return Ok(EncodeSummary::default());
        };
        trace!("tree:\n{tree}");

        let codes = CodeTable::from_tree(&tree);
        let content_bit_length = codes.content_bit_length(&frequencies);
        let tree_bit_length = metadata::write_tree_header(&mut writer, Some(&tree))?;
        metadata::write_content_length(&mut writer, content_bit_length)?;
        debug!(
            "header: tree {tree_bit_length} bits, content {content_bit_length} bits, longest code {} bits",
            codes.max_code_len()
        );

        input.rewind()?;
        let mut emitted = 0u64;
        let input_bytes = frequency::scan(&mut input, buffer_size, |chunk| {
            for &byte in chunk {
                let code = codes.code(byte).ok_or_else(|| {
                    Error::invalid_structure(format!(
                        "byte {byte:#04x} was not seen in the first pass; input changed between passes"
                    ))
                })?;
                write_code(&mut writer, code)?;
                emitted += code.len() as u64;
            }
            Ok(())
        })?;
        if emitted != content_bit_length {
            return Err(Error::invalid_structure(format!(
                "emitted {emitted} content bits but the header declares {content_bit_length}; input changed between passes"
            )));
        }

        writer.align()?;
        writer.flush()?;

        let summary = EncodeSummary {
            input_bytes,
            distinct_symbols: codes.len(),
            tree_bit_length,
            content_bit_length,
        };
        debug!(
            "encoded {} bytes into {} bytes",
            summary.input_bytes,
            summary.container_len()
        );
        Ok(summary)
    }

    /// Expand the container in `input` and write the original bytes to
    /// `output`. A source with no bytes at all counts as an empty container.
    pub fn decode<R, W>(&self, input: R, output: W) -> Result<DecodeSummary>
    where
        R: Read,
        W: Write,
    {
        let buffer_size = self.config.effective_buffer_size();
        let mut reader = BitReader::with_capacity(buffer_size, input);
        let mut output = BufWriter::with_capacity(buffer_size, output);

        let Some(header) = metadata::read_tree_header(&mut reader)? else {
            debug!("source is empty, nothing to decode");
            output.flush()?;
            return Ok(DecodeSummary::default());
        };
        let content_bit_length = metadata::read_content_length(&mut reader)?;
        let tree_bit_length = header.bit_length;
        debug!("header: tree {tree_bit_length} bits, content {content_bit_length} bits");

        let output_bytes = match &header.tree {
            Some(tree) => {
                let codes = CodeTable::from_tree(tree);
                decode_content(&codes, &mut reader, &mut output, content_bit_length)?
            }
            None if content_bit_length == 0 => 0,
            None => return Err(malformed("content declared without a code tree")),
        };
        output.flush()?;

        debug!("decoded {output_bytes} bytes");
        Ok(DecodeSummary {
            tree_bit_length,
            content_bit_length,
            output_bytes,
        })
    }

    /// In-memory [`encode`](Self::encode).
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut container = Vec::new();
        self.encode(Cursor::new(data), &mut container)?;
        Ok(container)
    }

    /// In-memory [`decode`](Self::decode).
    pub fn decompress(&self, container: &[u8]) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.decode(container, &mut data)?;
        Ok(data)
    }
}

fn malformed(message: &str) -> Error {
    warn!("malformed container: {message}");
    Error::invalid_structure(message)
}

/// Emit `code` up to eight bits at a time.
fn write_code<W: Write>(writer: &mut BitWriter<W>, code: &Code) -> Result<()> {
    for chunk in code.chunks(8) {
        let width = chunk.len() as u8;
        writer.write_bits(chunk.load_be::<u8>() << (8 - width), width)?;
    }
    Ok(())
}

/// Grow a candidate one bit at a time and emit a byte whenever it equals a
/// known code. Returns the number of bytes written.
fn decode_content<R: Read, W: Write>(
    codes: &CodeTable,
    reader: &mut BitReader<R>,
    output: &mut W,
    bit_length: u64,
) -> Result<u64> {
    let mut candidate = Code::with_capacity(codes.max_code_len());
    let mut written = 0u64;

    for _ in 0..bit_length {
        let bit = reader.read_bit().map_err(|e| {
            if e.is_end_of_stream() {
                warn!("content ended after {written} bytes, {bit_length} bits were declared");
            }
            e.truncated("content")
        })?;
        candidate.push(bit);

        if let Some(byte) = codes.symbol(&candidate) {
            output.write_all(&[byte])?;
            written += 1;
            candidate.clear();
        } else if candidate.len() >= codes.max_code_len() {
            return Err(malformed("content bits match no code"));
        }
    }

    if !candidate.is_empty() {
        return Err(malformed("content ends in the middle of a code"));
    }
    Ok(written)
}
