//! Container framing.
//!
//! ```text
//! [2 bytes LE: tree_bit_length]
//! [ceil(tree_bit_length / 8) bytes: serialized tree, zero-padded]
//! [8 bytes LE: content_bit_length]
//! [ceil(content_bit_length / 8) bytes: packed codes, zero-padded]
//! ```

use std::io::{Read, Write};

use log::trace;

use crate::bit_reader::BitReader;
use crate::bit_writer::BitWriter;
use crate::error::{Error, Result};
use crate::hufftree::HuffmanTree;

pub const TREE_LENGTH_BYTES: usize = 2;
pub const CONTENT_LENGTH_BYTES: usize = 8;

/// Bytes a container with the given bit lengths occupies on disk.
pub fn container_len(tree_bit_length: u16, content_bit_length: u64) -> u64 {
    (TREE_LENGTH_BYTES + CONTENT_LENGTH_BYTES) as u64
        + (tree_bit_length as u64).div_ceil(8)
        + content_bit_length.div_ceil(8)
}

/// Write the tree length, the tree bits and the padding after them.
/// `None` writes a zero-length tree. Returns the tree bit length.
pub fn write_tree_header<W: Write>(
    writer: &mut BitWriter<W>,
    tree: Option<&HuffmanTree>,
) -> Result<u16> {
    let bit_length = match tree {
        Some(tree) => u16::try_from(tree.bit_length()).map_err(|_| {
            Error::invalid_structure(format!(
                "serialized tree needs {} bits, header holds at most {}",
                tree.bit_length(),
                u16::MAX
            ))
        })?,
        None => 0,
    };

    writer.write_bulk(&bit_length.to_le_bytes())?;
    if let Some(tree) = tree {
        tree.write_bits(writer)?;
    }
    writer.align()?;
    trace!("wrote tree header: {bit_length} bits");
    Ok(bit_length)
}

/// A decoded tree header: the declared bit length and the tree it framed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeHeader {
    pub bit_length: u16,
    /// `None` when the header declares a zero-length tree.
    pub tree: Option<HuffmanTree>,
}

/// Read the tree length and the tree itself. Returns `None` when the
/// source has no bytes at all, which counts as an empty container.
pub fn read_tree_header<R: Read>(reader: &mut BitReader<R>) -> Result<Option<TreeHeader>> {
    let low = match reader.read_byte() {
        Ok(byte) => byte,
        Err(Error::EndOfStream) => return Ok(None),
        Err(e) => return Err(e),
    };
    let high = reader
        .read_byte()
        .map_err(|e| e.truncated("tree length"))?;
    let bit_length = u16::from_le_bytes([low, high]);
    trace!("tree header declares {bit_length} bits");

    let tree = HuffmanTree::read_bits(reader, bit_length)?;
    reader.align();
    Ok(Some(TreeHeader { bit_length, tree }))
}

pub fn write_content_length<W: Write>(writer: &mut BitWriter<W>, bit_length: u64) -> Result<()> {
    writer.write_bulk(&bit_length.to_le_bytes())
}

pub fn read_content_length<R: Read>(reader: &mut BitReader<R>) -> Result<u64> {
    let mut bytes = [0u8; CONTENT_LENGTH_BYTES];
    reader
        .read_bulk(&mut bytes)
        .map_err(|e| e.truncated("content length"))?;
    Ok(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn reader(bytes: Vec<u8>) -> BitReader<Cursor<Vec<u8>>> {
        BitReader::new(Cursor::new(bytes))
    }

    #[test]
    fn header_layout_is_little_endian_and_padded() {
        let tree = HuffmanTree::from_bytes(b"AAB").unwrap();
        let mut writer = BitWriter::new(Vec::new());
        assert_eq!(write_tree_header(&mut writer, Some(&tree)).unwrap(), 19);
        write_content_length(&mut writer, 0x0102).unwrap();
        let bytes = writer.into_inner().unwrap();

        assert_eq!(&bytes[..2], &[19, 0]);
        // 19 tree bits take 3 bytes, then the 8-byte content length
        assert_eq!(bytes.len(), 2 + 3 + 8);
        assert_eq!(&bytes[5..], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn header_reads_back() {
        let tree = HuffmanTree::from_bytes(b"hello, header").unwrap();
        let mut writer = BitWriter::new(Vec::new());
        write_tree_header(&mut writer, Some(&tree)).unwrap();
        write_content_length(&mut writer, 77).unwrap();

        let mut r = reader(writer.into_inner().unwrap());
        let header = read_tree_header(&mut r).unwrap().unwrap();
        assert_eq!(header.bit_length as usize, tree.bit_length());
        assert_eq!(header.tree.unwrap().leaf_count(), tree.leaf_count());
        assert_eq!(read_content_length(&mut r).unwrap(), 77);
    }

    #[test]
    fn empty_source_is_an_empty_container() {
        let mut r = reader(vec![]);
        assert!(read_tree_header(&mut r).unwrap().is_none());
    }

    #[test]
    fn zero_length_tree() {
        let mut writer = BitWriter::new(Vec::new());
        assert_eq!(write_tree_header(&mut writer, None).unwrap(), 0);
        write_content_length(&mut writer, 0).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_eq!(bytes, vec![0; 10]);

        let mut r = reader(bytes);
        let header = read_tree_header(&mut r).unwrap().unwrap();
        assert_eq!(header.bit_length, 0);
        assert!(header.tree.is_none());
        assert_eq!(read_content_length(&mut r).unwrap(), 0);
    }

    #[test]
    fn truncated_lengths_are_structure_errors() {
        let mut r = reader(vec![5]);
        assert!(matches!(
            read_tree_header(&mut r),
            Err(Error::InvalidStructure(_))
        ));

        let mut r = reader(vec![1, 2, 3]);
        assert!(matches!(
            read_content_length(&mut r),
            Err(Error::InvalidStructure(_))
        ));
    }

    #[test]
    fn container_len_rounds_up() {
        assert_eq!(container_len(0, 0), 10);
        assert_eq!(container_len(19, 3), 10 + 3 + 1);
        assert_eq!(container_len(16, 64), 10 + 2 + 8);
    }
}
